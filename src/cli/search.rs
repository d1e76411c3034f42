use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tessera::config::TesseraConfig;
use tessera::embedding::create_provider;
use tessera::knowledge::relations::RelationshipScorer;
use tessera::knowledge::search::{related_nodes, NodeSearch, RelatedNode, SearchOptions, SearchResult};
use tessera::knowledge::tags::TagCooccurrence;

use super::{input, Output};

const PREVIEW_CHARS: usize = 120;

/// Run a free-text search over a node dump.
pub fn run(
    config: &TesseraConfig,
    nodes_path: &Path,
    query: &str,
    limit: Option<usize>,
    tags: Vec<String>,
    output: Output,
) -> Result<()> {
    let nodes = input::load_nodes(nodes_path)?;
    let provider = create_provider(&config.embedding);
    let search = NodeSearch::exact(provider.as_ref(), &nodes);
    let cooccurrence = TagCooccurrence::from_nodes(&nodes);

    let options = SearchOptions {
        limit: limit.unwrap_or(config.search.default_limit),
        tags,
        tag_expansion_limit: config.search.tag_expansion_limit,
    };
    let results = search.search(query, &nodes, &cooccurrence, &options);

    output.emit(&results, |results: &Vec<SearchResult>| {
        if results.is_empty() {
            println!("No results found.");
            return;
        }
        println!("Found {} result(s)\n", results.len());
        for (i, result) in results.iter().enumerate() {
            println!(
                "  {}. [{}] {} (score: {:.4})",
                i + 1,
                result.node_type,
                result.id,
                result.score
            );
            if !result.matched_tags.is_empty() {
                println!("     tags: {}", result.matched_tags.join(", "));
            }
            println!("     {}", result.preview);
            println!();
        }
    })
}

/// List the nodes most strongly related to one node.
pub fn related(
    config: &TesseraConfig,
    nodes_path: &Path,
    id: &str,
    limit: Option<usize>,
    now: DateTime<Utc>,
    output: Output,
) -> Result<()> {
    let nodes = input::load_nodes(nodes_path)?;
    anyhow::ensure!(
        nodes.iter().any(|n| n.id == id),
        "node {id} not found in {}",
        nodes_path.display()
    );

    let scorer = RelationshipScorer::from_config(config.embedding.dimension, &config.relations);
    let related = related_nodes(
        id,
        &nodes,
        &scorer,
        now,
        limit.unwrap_or(config.search.default_limit),
    );

    output.emit(&related, |related: &Vec<RelatedNode>| {
        println!("Nodes related to {id}\n");
        for (i, node) in related.iter().enumerate() {
            println!(
                "  {}. [{}] {} ({}, strength: {:.4})",
                i + 1,
                node.node_type,
                node.id,
                node.kind,
                node.strength
            );
            println!("     {}", node.preview);
        }
    })
}

/// First line of `content`, cut to a terminal-friendly width.
pub fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default();
    match line.char_indices().nth(PREVIEW_CHARS) {
        None => line.to_string(),
        Some((end, _)) => format!("{}...", &line[..end]),
    }
}
