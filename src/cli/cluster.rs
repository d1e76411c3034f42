use std::path::Path;

use anyhow::Result;
use tessera::config::TesseraConfig;
use tessera::knowledge::clustering::{Cluster, SimilarityClustering};

use super::{input, Output};

/// Cluster a node dump and print the groups, most coherent first.
pub fn run(
    config: &TesseraConfig,
    nodes_path: &Path,
    threshold: Option<f64>,
    output: Output,
) -> Result<()> {
    let nodes = input::load_nodes(nodes_path)?;

    let mut clustering_config = config.clustering.clone();
    if let Some(threshold) = threshold {
        anyhow::ensure!(
            (0.0..=1.0).contains(&threshold),
            "threshold must be within [0, 1], got {threshold}"
        );
        clustering_config.similarity_threshold = threshold;
    }
    let clustering =
        SimilarityClustering::from_config(&clustering_config, config.embedding.dimension);
    let clusters = clustering.cluster(&nodes);

    output.emit(&clusters, |clusters: &Vec<Cluster>| {
        println!(
            "{} cluster(s) from {} node(s) at threshold {:.2}\n",
            clusters.len(),
            nodes.len(),
            clustering.threshold()
        );
        for cluster in clusters {
            println!(
                "  {} ({} member(s), coherence: {:.2}, center: {})",
                cluster.id,
                cluster.len(),
                cluster.coherence,
                cluster.center_id
            );
            if !cluster.keywords.is_empty() {
                println!("     keywords: {}", cluster.keywords.join(", "));
            }
            println!("     members:  {}", cluster.member_ids.join(", "));
        }
    })
}
