use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tessera::config::TesseraConfig;
use tessera::knowledge::context::{workstream_of, SessionContext, SessionContextSelector};

use super::{input, Output};

/// Select warmup context from a node dump and print it.
pub fn run(
    config: &TesseraConfig,
    nodes_path: &Path,
    target: Option<usize>,
    now: DateTime<Utc>,
    output: Output,
) -> Result<()> {
    let nodes = input::load_nodes(nodes_path)?;

    let mut session = config.session.clone();
    if let Some(target) = target {
        session.target_count = target;
    }
    let selector = SessionContextSelector::new(session, config.embedding.dimension);
    let context = selector.select(&nodes, now);

    output.emit(&context, print_context)
}

fn print_context(context: &SessionContext) {
    let d = &context.diagnostics;
    println!(
        "Selected {} of {} node(s) across {} workstream(s)",
        context.selected.len(),
        d.total_nodes,
        d.workstream_count
    );
    println!(
        "  Priority: {}/{} quota    Backfilled: {}",
        d.priority_selected, d.priority_quota, d.backfilled
    );
    if !d.high_volume_workstreams.is_empty() {
        println!("  High-volume: {}", d.high_volume_workstreams.join(", "));
    }
    println!();

    for (i, selected) in context.selected.iter().enumerate() {
        let node = &selected.node;
        println!(
            "  {}. [{}] {} ({}, {:?}, score: {:.4})",
            i + 1,
            node.node_type,
            node.id,
            workstream_of(node),
            selected.reason,
            selected.score,
        );
        println!("     {}", super::search::preview(&node.content));
    }

    if !context.summaries.is_empty() {
        println!();
        println!("Not shown:");
        for summary in &context.summaries {
            println!("  - {} (coherence: {:.2})", summary.label, summary.coherence);
        }
    }
}
