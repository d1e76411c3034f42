use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tessera::config::TesseraConfig;
use tessera::knowledge::relations::{
    prune_edges, rebuild_relationships, PruneReport, RebuildReport, RelationshipScorer,
};

use super::{input, Output};

/// Rebuild relationship edges for a node dump, or prune an existing edge dump
/// against it when `prune` is given.
pub fn run(
    config: &TesseraConfig,
    nodes_path: &Path,
    prune: Option<&Path>,
    now: DateTime<Utc>,
    output: Output,
) -> Result<()> {
    let nodes = input::load_nodes(nodes_path)?;
    let scorer = RelationshipScorer::from_config(config.embedding.dimension, &config.relations);

    match prune {
        Some(edges_path) => {
            let edges = input::load_edges(edges_path)?;
            let report = prune_edges(&edges, &nodes, &scorer, &config.relations, now);
            output.emit(&report, |report: &PruneReport| {
                println!(
                    "Kept {} edge(s), removed {}",
                    report.kept.len(),
                    report.removed.len()
                );
                for id in &report.removed {
                    println!("  - {id}");
                }
            })
        }
        None => {
            let report = rebuild_relationships(&nodes, &scorer, &config.relations, now);
            output.emit(&report, |report: &RebuildReport| {
                println!(
                    "{} edge(s) from {} scored pair(s)\n",
                    report.edges.len(),
                    report.pairs_scored
                );
                for edge in &report.edges {
                    println!(
                        "  {} -[{}]-> {} (strength: {:.4})",
                        edge.source,
                        edge.kind,
                        edge.target,
                        edge.strength.unwrap_or_default()
                    );
                    for line in &edge.evidence {
                        println!("     {line}");
                    }
                }
            })
        }
    }
}
