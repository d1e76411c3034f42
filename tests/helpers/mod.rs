#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tessera::knowledge::types::{Importance, Node, NodeType};

/// Fixed reference instant so recency scores are reproducible.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

/// A node created and last updated `hours_ago` before [`now`].
pub fn node_at(id: &str, node_type: NodeType, content: &str, hours_ago: i64) -> Node {
    let at = now() - Duration::hours(hours_ago);
    Node::new(id, node_type, content, at)
}

/// A fresh progress node.
pub fn progress(id: &str, content: &str) -> Node {
    node_at(id, NodeType::Progress, content, 0)
}

/// A burst of near-identical progress notes in one workstream, one hour apart.
pub fn progress_burst(prefix: &str, workstream: &str, count: usize) -> Vec<Node> {
    (0..count)
        .map(|i| {
            node_at(
                &format!("{prefix}-{i}"),
                NodeType::Progress,
                &format!("ran the {workstream} job again, batch {i} finished"),
                i as i64,
            )
            .with_tags([format!("ws:{workstream}")])
        })
        .collect()
}

/// A blocker tagged high-importance node.
pub fn blocker(id: &str, content: &str, hours_ago: i64) -> Node {
    node_at(id, NodeType::Progress, content, hours_ago)
        .with_tags(["blocker"])
        .with_importance(Importance::High)
}
