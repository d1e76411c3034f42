pub mod cluster;
pub mod input;
pub mod path;
pub mod relations;
pub mod search;
pub mod tags;
pub mod warmup;

use anyhow::Result;
use serde::Serialize;

/// How a subcommand renders its result.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON when `--json` was given, otherwise run `text`.
    pub fn emit<T: Serialize>(self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}
