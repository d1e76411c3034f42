//! Breadth-first connection search over the edge graph.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use super::types::{Edge, RelationKind};

/// One hop along a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub from: String,
    pub to: String,
    pub edge_id: String,
    pub kind: RelationKind,
    /// `true` when the hop follows the edge from source to target. Matters for
    /// directional kinds such as `blocks` and `derived_from`.
    pub forward: bool,
}

/// A shortest path between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionPath {
    /// Node IDs from start to end inclusive.
    pub node_ids: Vec<String>,
    pub steps: Vec<PathStep>,
}

impl ConnectionPath {
    /// Number of hops.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Find a shortest path from `start` to `end` of at most `max_depth` hops.
///
/// Edges are walked in both directions. Among equally short paths the first one
/// reached in edge-list order wins. Returns `None` when either node has no edges, the
/// nodes are disconnected, or every route is longer than `max_depth`. A node is always
/// connected to itself by the empty path.
pub fn find_path(
    edges: &[Edge],
    start: &str,
    end: &str,
    max_depth: usize,
) -> Option<ConnectionPath> {
    if start == end {
        return Some(ConnectionPath {
            node_ids: vec![start.to_string()],
            steps: Vec::new(),
        });
    }

    // node -> (neighbor, edge index, forward)
    let mut adjacency: HashMap<&str, Vec<(&str, usize, bool)>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push((edge.target.as_str(), i, true));
        adjacency
            .entry(edge.target.as_str())
            .or_default()
            .push((edge.source.as_str(), i, false));
    }
    if !adjacency.contains_key(start) || !adjacency.contains_key(end) {
        return None;
    }

    let mut came_from: HashMap<&str, (&str, usize, bool)> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for &(next, edge_idx, forward) in &adjacency[current] {
            if !visited.insert(next) {
                continue;
            }
            came_from.insert(next, (current, edge_idx, forward));
            if next == end {
                return Some(reconstruct(edges, &came_from, start, end));
            }
            queue.push_back((next, depth + 1));
        }
    }
    None
}

fn reconstruct(
    edges: &[Edge],
    came_from: &HashMap<&str, (&str, usize, bool)>,
    start: &str,
    end: &str,
) -> ConnectionPath {
    let mut node_ids = vec![end.to_string()];
    let mut steps = Vec::new();
    let mut current = end;
    while current != start {
        let (prev, edge_idx, forward) = came_from[current];
        let edge = &edges[edge_idx];
        steps.push(PathStep {
            from: prev.to_string(),
            to: current.to_string(),
            edge_id: edge.id.clone(),
            kind: edge.kind,
            forward,
        });
        node_ids.push(prev.to_string());
        current = prev;
    }
    node_ids.reverse();
    steps.reverse();
    ConnectionPath { node_ids, steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn edge(id: &str, source: &str, target: &str, kind: RelationKind) -> Edge {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        Edge::new(id, source, target, kind, t)
    }

    fn chain() -> Vec<Edge> {
        vec![
            edge("e1", "a", "b", RelationKind::RelatesTo),
            edge("e2", "c", "b", RelationKind::Blocks),
            edge("e3", "c", "d", RelationKind::DerivedFrom),
            edge("e4", "x", "y", RelationKind::References),
        ]
    }

    #[test]
    fn test_same_node_is_single_element_path() {
        let path = find_path(&[], "a", "a", 0).unwrap();
        assert_eq!(path.node_ids, vec!["a"]);
        assert_eq!(path.len(), 0);
    }

    #[test]
    fn test_walks_edges_both_ways() {
        let path = find_path(&chain(), "a", "d", 5).unwrap();
        assert_eq!(path.node_ids, vec!["a", "b", "c", "d"]);
        assert_eq!(path.len(), 3);
        assert!(path.steps[0].forward);
        assert!(!path.steps[1].forward);
        assert_eq!(path.steps[1].kind, RelationKind::Blocks);
        assert_eq!(path.steps[1].edge_id, "e2");
        assert!(path.steps[2].forward);
    }

    #[test]
    fn test_respects_max_depth() {
        assert!(find_path(&chain(), "a", "d", 2).is_none());
        let path = find_path(&chain(), "a", "c", 2).unwrap();
        assert!(path.node_ids.len() <= 3);
    }

    #[test]
    fn test_disconnected_and_unknown() {
        assert!(find_path(&chain(), "a", "y", 10).is_none());
        assert!(find_path(&chain(), "a", "missing", 10).is_none());
        assert!(find_path(&chain(), "missing", "a", 10).is_none());
    }

    #[test]
    fn test_prefers_shortest_route() {
        let mut edges = chain();
        edges.push(edge("e5", "a", "d", RelationKind::RelatesTo));
        let path = find_path(&edges, "a", "d", 5).unwrap();
        assert_eq!(path.node_ids, vec!["a", "d"]);
    }
}
