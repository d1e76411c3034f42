use std::path::Path;

use anyhow::Result;
use tessera::knowledge::tags::{normalize_tags, TagCooccurrence};

use super::{input, Output};

/// Suggest tags that co-occur with `tags` across a node dump.
pub fn run(nodes_path: &Path, tags: &[String], limit: usize, output: Output) -> Result<()> {
    let nodes = input::load_nodes(nodes_path)?;
    let cooccurrence = TagCooccurrence::from_nodes(&nodes);
    let base = normalize_tags(tags);
    let expanded = cooccurrence.expand(&base, limit);

    output.emit(&expanded, |expanded: &Vec<String>| {
        if expanded.is_empty() {
            println!("No co-occurring tags for {}.", base.join(", "));
            return;
        }
        for tag in expanded {
            let count: u32 = base.iter().map(|b| cooccurrence.count(b, tag)).sum();
            println!("  {tag:<24} {count}");
        }
    })
}
