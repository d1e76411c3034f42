mod helpers;

use helpers::{blocker, node_at, now, progress_burst};
use tessera::config::SessionConfig;
use tessera::knowledge::context::{SelectionReason, SessionContextSelector};
use tessera::knowledge::types::{Node, NodeType};

fn selector(target: usize) -> SessionContextSelector {
    let config = SessionConfig {
        target_count: target,
        ..SessionConfig::default()
    };
    SessionContextSelector::new(config, 256)
}

fn selected_ids(nodes: &[Node], target: usize) -> Vec<String> {
    selector(target)
        .select(nodes, now())
        .selected
        .into_iter()
        .map(|s| s.node.id)
        .collect()
}

fn distinct_topics() -> Vec<Node> {
    [
        "sailboat hull measurements recorded",
        "kubernetes ingress certificate rotated",
        "quarterly budget spreadsheet reconciled",
        "violin practice schedule drafted",
    ]
    .iter()
    .enumerate()
    .map(|(i, content)| node_at(&format!("topic-{i}"), NodeType::Progress, content, 2))
    .collect()
}

#[test]
fn selection_size_is_min_of_target_and_total() {
    let nodes = progress_burst("burst", "ingest", 30);
    assert_eq!(selector(10).select(&nodes, now()).selected.len(), 10);
    assert_eq!(selector(50).select(&nodes, now()).selected.len(), 30);
    assert_eq!(selector(0).select(&nodes, now()).selected.len(), 0);
}

#[test]
fn empty_input_selects_nothing() {
    let context = selector(10).select(&[], now());
    assert!(context.selected.is_empty());
    assert!(context.summaries.is_empty());
    assert_eq!(context.diagnostics.total_nodes, 0);
    assert_eq!(context.diagnostics.workstream_count, 0);
}

#[test]
fn blocker_survives_a_burst_of_progress_notes() {
    let mut nodes = progress_burst("burst", "ingest", 30);
    nodes.push(blocker("stuck", "deploy pipeline rejects signed artifacts", 72));
    nodes.push(node_at(
        "choice",
        NodeType::Decision,
        "keep hashing vectorizer for offline use",
        96,
    ));

    let context = selector(10).select(&nodes, now());
    assert_eq!(context.selected.len(), 10);

    for id in ["stuck", "choice"] {
        let picked = context
            .selected
            .iter()
            .find(|s| s.node.id == id)
            .unwrap_or_else(|| panic!("{id} should be selected"));
        assert_eq!(picked.reason, SelectionReason::Priority);
    }
    assert_eq!(context.diagnostics.priority_quota, 3);
    assert_eq!(context.diagnostics.priority_selected, 2);
}

#[test]
fn left_out_nodes_are_summarized() {
    let nodes = progress_burst("burst", "ingest", 30);
    let context = selector(10).select(&nodes, now());

    let summarized: usize = context.summaries.iter().map(|s| s.member_ids.len()).sum();
    assert_eq!(summarized, nodes.len() - context.selected.len());
    assert!(context.summaries[0].label.starts_with(&format!(
        "{} related items",
        context.summaries[0].member_ids.len()
    )));
    assert!(context
        .summaries
        .windows(2)
        .all(|w| w[0].member_ids.len() >= w[1].member_ids.len()));
}

#[test]
fn repetitive_workstream_is_flagged_high_volume() {
    let mut nodes = progress_burst("burst", "ingest", 12);
    nodes.extend(distinct_topics());

    let context = selector(10).select(&nodes, now());
    assert_eq!(context.diagnostics.workstream_count, 2);
    assert_eq!(context.diagnostics.high_volume_workstreams, vec!["ws:ingest"]);
}

#[test]
fn diversity_beats_recency_within_a_burst() {
    let mut nodes = progress_burst("burst", "ingest", 10);
    nodes.extend(distinct_topics());

    let ids = selected_ids(&nodes, 5);
    assert_eq!(ids.len(), 5);
    for i in 0..4 {
        assert!(ids.contains(&format!("topic-{i}")), "topic-{i} missing from {ids:?}");
    }
    assert_eq!(ids.iter().filter(|id| id.starts_with("burst-")).count(), 1);
}

#[test]
fn selection_is_deterministic() {
    let mut nodes = progress_burst("burst", "ingest", 15);
    nodes.extend(distinct_topics());
    nodes.push(blocker("stuck", "deploy pipeline rejects signed artifacts", 5));

    let first = selected_ids(&nodes, 8);
    let second = selected_ids(&nodes, 8);
    assert_eq!(first, second);
}

#[test]
fn stale_nodes_score_lower() {
    let fresh = node_at("fresh", NodeType::Progress, "fresh note", 0);
    let stale = node_at("stale", NodeType::Progress, "stale note", 48);
    let context = selector(2).select(&[stale, fresh], now());

    let score = |id: &str| {
        context
            .selected
            .iter()
            .find(|s| s.node.id == id)
            .map(|s| s.score)
            .unwrap()
    };
    assert!((score("fresh") - 1.5).abs() < 1e-9);
    assert!((score("stale") - 1.5 * (-2.0f64).exp()).abs() < 1e-9);
}

#[test]
fn near_duplicate_waits_for_relaxed_diversity() {
    let nodes = vec![
        node_at("first", NodeType::Progress, "ran the ingest job again, batch 0 finished", 0),
        // cosine 0.875 with "first", so diversity 0.125: below the strict threshold,
        // above the relaxed one.
        node_at("repeat", NodeType::Progress, "ran the ingest job again, batch 2 finished", 1),
        node_at("boat", NodeType::Progress, "sailboat hull measurements recorded", 48),
        node_at("violin", NodeType::Progress, "violin practice schedule drafted", 48),
    ];

    let context = selector(4).select(&nodes, now());
    let order: Vec<&str> = context.selected.iter().map(|s| s.node.id.as_str()).collect();

    // "repeat" outscores both stale topics but is held back while half the slots
    // are still open, then taken on merit once the threshold relaxes.
    assert_eq!(order[0], "first");
    assert_eq!(order[3], "repeat");
    assert_eq!(context.selected[3].reason, SelectionReason::Diverse);
    assert_eq!(context.diagnostics.backfilled, 0);
}
