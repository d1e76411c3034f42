mod helpers;

use chrono::Duration;
use helpers::{node_at, now};
use tessera::config::RelationsConfig;
use tessera::knowledge::relations::{prune_edges, rebuild_relationships, RelationshipScorer};
use tessera::knowledge::types::{Edge, Node, NodeType, RelationKind};

fn scorer() -> RelationshipScorer {
    RelationshipScorer::from_config(256, &RelationsConfig::default())
}

fn nodes() -> Vec<Node> {
    vec![
        node_at(
            "fix",
            NodeType::Progress,
            "fixed flaky retry in uploader commit:abc1234f",
            72,
        ),
        node_at(
            "notes",
            NodeType::Progress,
            "release notes mention commit:ABC1234F uploader retry",
            24,
        ),
        node_at(
            "boat",
            NodeType::Idea,
            "sailboat hull measurements recorded",
            24 * 200,
        ),
    ]
}

#[test]
fn rebuild_links_nodes_sharing_a_commit() {
    let report = rebuild_relationships(&nodes(), &scorer(), &RelationsConfig::default(), now());
    assert_eq!(report.pairs_scored, 3);
    assert_eq!(report.edges.len(), 1);

    let edge = &report.edges[0];
    // The newer node points at the older one.
    assert_eq!(edge.source, "notes");
    assert_eq!(edge.target, "fix");
    assert_eq!(edge.kind, RelationKind::References);
    assert!(edge.strength.unwrap() >= 0.35);
    assert!(edge.evidence.iter().any(|e| e.contains("abc1234f")));
    assert!(!edge.id.is_empty());
}

#[test]
fn rebuild_of_empty_or_single_node_set_is_empty() {
    let config = RelationsConfig::default();
    let report = rebuild_relationships(&[], &scorer(), &config, now());
    assert_eq!(report.pairs_scored, 0);
    assert!(report.edges.is_empty());

    let report = rebuild_relationships(&nodes()[..1], &scorer(), &config, now());
    assert_eq!(report.pairs_scored, 0);
}

#[test]
fn prune_drops_dangling_edges_and_keeps_asserted_ones() {
    let config = RelationsConfig::default();
    let mut edges = rebuild_relationships(&nodes(), &scorer(), &config, now()).edges;
    let original = edges[0].strength.unwrap();
    edges.push(Edge::new("manual", "fix", "boat", RelationKind::RelatesTo, now()));
    edges.push(Edge::new("dangling", "fix", "gone", RelationKind::RelatesTo, now()));

    // Four months later the temporal factor has decayed to zero.
    let later = now() + Duration::days(120);
    let report = prune_edges(&edges, &nodes(), &scorer(), &config, later);

    assert_eq!(report.removed, vec!["dangling"]);
    assert_eq!(report.kept.len(), 2);
    let refreshed = report.kept.iter().find(|e| e.source == "notes").unwrap();
    assert!(refreshed.strength.unwrap() < original);
    assert!(report.kept.iter().any(|e| e.id == "manual" && e.strength.is_none()));
}

#[test]
fn prune_threshold_removes_weakened_edges() {
    let mut config = RelationsConfig::default();
    let edges = rebuild_relationships(&nodes(), &scorer(), &config, now()).edges;

    config.prune_threshold = 0.95;
    let report = prune_edges(&edges, &nodes(), &scorer(), &config, now());
    assert!(report.kept.is_empty());
    assert_eq!(report.removed, vec![edges[0].id.clone()]);
}
