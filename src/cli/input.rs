//! Loading node and edge dumps handed over by the storage layer.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tessera::knowledge::types::{Edge, Node};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON array of nodes.
pub fn load_nodes(path: &Path) -> Result<Vec<Node>, InputError> {
    let nodes: Vec<Node> = load_json(path)?;
    tracing::debug!(path = %path.display(), count = nodes.len(), "loaded nodes");
    Ok(nodes)
}

/// Read a JSON array of edges.
pub fn load_edges(path: &Path) -> Result<Vec<Edge>, InputError> {
    let edges: Vec<Edge> = load_json(path)?;
    tracing::debug!(path = %path.display(), count = edges.len(), "loaded edges");
    Ok(edges)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
