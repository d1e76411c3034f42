//! Relationship scoring, classification, and edge maintenance.
//!
//! [`RelationshipScorer`] combines four factors into a strength in `[0, 1]`:
//!
//! | Factor | Weight | Signal |
//! |--------|--------|--------|
//! | content | 0.4 | cosine similarity of hashed content vectors |
//! | temporal | 0.2 | both nodes recently updated |
//! | explicit reference | 0.3 | shared commit, shared tags, or reference phrasing |
//! | reinforcement | 0.1 | reserved, always 0 |
//!
//! [`classify`] then picks a [`RelationKind`] from textual cues. The
//! [`rebuild_relationships`] and [`prune_edges`] sweeps apply both to whole node sets.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::types::{Edge, Node, RelationKind};
use crate::config::RelationsConfig;
use crate::embedding::{cosine_similarity, vectorize};

pub const CONTENT_WEIGHT: f64 = 0.4;
pub const TEMPORAL_WEIGHT: f64 = 0.2;
pub const EXPLICIT_WEIGHT: f64 = 0.3;
pub const REINFORCEMENT_WEIGHT: f64 = 0.1;

/// Explicit-reference value for reference phrasing without shared tags or commits.
const REFERENCE_CUE_SCORE: f64 = 0.6;

/// Shared tags needed for a full explicit-reference score.
const FULL_TAG_OVERLAP: f64 = 3.0;

/// Tags too generic to count as evidence of a link.
const TRIVIAL_TAGS: &[&str] = &["note", "notes", "misc", "general"];

static COMMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcommit:([0-9a-f]{7,40})").expect("valid regex"));
static REFERENCE_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(references|see also|as noted|refers to)\b").expect("valid regex")
});
static BLOCKING_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(blocked by|blocks|waiting on|dependency)\b").expect("valid regex")
});
static DERIVATION_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(builds on|derived from|extends|refactor of)\b").expect("valid regex")
});
static DUPLICATE_CUES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(duplicate|same as)\b").expect("valid regex"));

/// Per-factor breakdown of a pairwise relationship score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelationshipFactors {
    pub content: f64,
    pub temporal: f64,
    pub explicit_reference: f64,
    /// Feedback signal from accepted/rejected links. Not collected yet, so always 0.
    pub reinforcement: f64,
    /// Weighted sum of the factors, clamped to `[0, 1]`.
    pub strength: f64,
}

/// Scores how strongly two nodes are related.
#[derive(Debug, Clone)]
pub struct RelationshipScorer {
    dimension: usize,
    temporal_window_days: f64,
}

impl RelationshipScorer {
    pub fn new(dimension: usize, temporal_window_days: f64) -> Self {
        Self {
            dimension,
            temporal_window_days,
        }
    }

    pub fn from_config(dimension: usize, config: &RelationsConfig) -> Self {
        Self::new(dimension, config.temporal_window_days)
    }

    /// Score a pair of nodes as of `now`.
    pub fn score(&self, a: &Node, b: &Node, now: DateTime<Utc>) -> RelationshipFactors {
        let va = vectorize(&a.content, self.dimension);
        let vb = vectorize(&b.content, self.dimension);
        self.score_with_vectors(a, &va, b, &vb, now)
    }

    /// Score a pair whose content vectors are already computed.
    pub fn score_with_vectors(
        &self,
        a: &Node,
        va: &[f32],
        b: &Node,
        vb: &[f32],
        now: DateTime<Utc>,
    ) -> RelationshipFactors {
        let content = f64::from(cosine_similarity(va, vb)).clamp(0.0, 1.0);
        let temporal = self.temporal_factor(a, b, now);
        let explicit_reference = explicit_reference_factor(a, b);
        let reinforcement = 0.0;

        let strength = (CONTENT_WEIGHT * content
            + TEMPORAL_WEIGHT * temporal
            + EXPLICIT_WEIGHT * explicit_reference
            + REINFORCEMENT_WEIGHT * reinforcement)
            .clamp(0.0, 1.0);

        RelationshipFactors {
            content,
            temporal,
            explicit_reference,
            reinforcement,
            strength,
        }
    }

    /// `max(0, 1 - avg_age_days / window)` over both nodes' last update.
    fn temporal_factor(&self, a: &Node, b: &Node, now: DateTime<Utc>) -> f64 {
        if self.temporal_window_days <= 0.0 {
            return 0.0;
        }
        let avg_age_days = (a.age_days(now) + b.age_days(now)) / 2.0;
        (1.0 - avg_age_days / self.temporal_window_days).clamp(0.0, 1.0)
    }
}

/// Explicit-reference signal between two nodes.
///
/// A shared commit hash scores 1.0; otherwise shared non-trivial tags score
/// `min(1, shared / 3)`; otherwise reference phrasing in either node scores 0.6.
pub fn explicit_reference_factor(a: &Node, b: &Node) -> f64 {
    let commits_a = commit_hashes(a);
    if !commits_a.is_empty() && commit_hashes(b).iter().any(|h| commits_a.contains(h)) {
        return 1.0;
    }

    let overlap = shared_tags(a, b).len();
    if overlap > 0 {
        return (overlap as f64 / FULL_TAG_OVERLAP).min(1.0);
    }

    if REFERENCE_CUES.is_match(&combined_content(a, b)) {
        return REFERENCE_CUE_SCORE;
    }
    0.0
}

/// Pick a relation kind for a scored pair. Blocking cues take precedence over
/// derivation cues, which take precedence over duplicate cues.
pub fn classify(a: &Node, b: &Node, factors: &RelationshipFactors) -> RelationKind {
    let text = combined_content(a, b);
    if BLOCKING_CUES.is_match(&text) {
        RelationKind::Blocks
    } else if DERIVATION_CUES.is_match(&text) {
        RelationKind::DerivedFrom
    } else if DUPLICATE_CUES.is_match(&text) {
        RelationKind::Duplicates
    } else if factors.explicit_reference >= REFERENCE_CUE_SCORE {
        RelationKind::References
    } else {
        RelationKind::RelatesTo
    }
}

/// Lowercased commit hashes found in a node's tags and content.
pub fn commit_hashes(node: &Node) -> BTreeSet<String> {
    node.tags
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(node.content.as_str()))
        .flat_map(|text| COMMIT_RE.captures_iter(text))
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

/// Non-trivial tags present on both nodes, in `a`'s order.
pub fn shared_tags<'a>(a: &'a Node, b: &Node) -> Vec<&'a str> {
    a.tags
        .iter()
        .map(String::as_str)
        .filter(|t| !TRIVIAL_TAGS.contains(t) && b.has_tag(t))
        .collect()
}

fn combined_content(a: &Node, b: &Node) -> String {
    format!("{}\n{}", a.content, b.content)
}

// ── Edge maintenance ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RebuildReport {
    pub pairs_scored: usize,
    /// New edges, strongest first.
    pub edges: Vec<Edge>,
}

#[derive(Debug, Serialize)]
pub struct PruneReport {
    pub kept: Vec<Edge>,
    pub removed: Vec<String>,
}

/// Score every unordered node pair and emit an edge for each pair whose strength
/// reaches `config.rebuild_threshold`.
///
/// The newer node (by `created_at`, later input position on ties) is the source.
pub fn rebuild_relationships(
    nodes: &[Node],
    scorer: &RelationshipScorer,
    config: &RelationsConfig,
    now: DateTime<Utc>,
) -> RebuildReport {
    let vectors: Vec<Vec<f32>> = nodes
        .iter()
        .map(|n| vectorize(&n.content, scorer.dimension))
        .collect();

    let mut pairs_scored = 0usize;
    let mut scored: Vec<(Edge, f64)> = Vec::new();

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            pairs_scored += 1;
            let (a, b) = (&nodes[i], &nodes[j]);
            let factors = scorer.score_with_vectors(a, &vectors[i], b, &vectors[j], now);
            if factors.strength < config.rebuild_threshold {
                continue;
            }

            let (source, target) = if a.created_at > b.created_at { (a, b) } else { (b, a) };
            let mut edge = Edge::new(
                uuid::Uuid::now_v7().to_string(),
                &source.id,
                &target.id,
                classify(a, b, &factors),
                now,
            );
            edge.strength = Some(factors.strength);
            edge.evidence = evidence(a, b, &factors);
            scored.push((edge, factors.strength));
        }
    }

    scored.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(std::cmp::Ordering::Equal));
    let edges: Vec<Edge> = scored.into_iter().map(|(edge, _)| edge).collect();

    tracing::info!(
        nodes = nodes.len(),
        pairs_scored,
        edges = edges.len(),
        threshold = config.rebuild_threshold,
        "relationship rebuild complete"
    );

    RebuildReport {
        pairs_scored,
        edges,
    }
}

/// Drop edges whose endpoints are gone or whose refreshed strength falls below
/// `config.prune_threshold`.
///
/// Edges without a recorded strength were asserted by the caller and are only
/// dropped for missing endpoints. Kept scored edges carry the refreshed strength.
pub fn prune_edges(
    edges: &[Edge],
    nodes: &[Node],
    scorer: &RelationshipScorer,
    config: &RelationsConfig,
    now: DateTime<Utc>,
) -> PruneReport {
    let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for edge in edges {
        let (Some(source), Some(target)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            removed.push(edge.id.clone());
            continue;
        };

        if edge.strength.is_none() {
            kept.push(edge.clone());
            continue;
        }

        let factors = scorer.score(source, target, now);
        if factors.strength < config.prune_threshold {
            removed.push(edge.id.clone());
        } else {
            let mut refreshed = edge.clone();
            refreshed.strength = Some(factors.strength);
            kept.push(refreshed);
        }
    }

    tracing::info!(
        kept = kept.len(),
        removed = removed.len(),
        threshold = config.prune_threshold,
        "edge prune complete"
    );

    PruneReport { kept, removed }
}

fn evidence(a: &Node, b: &Node, factors: &RelationshipFactors) -> Vec<String> {
    let mut out = vec![format!("content similarity {:.2}", factors.content)];

    let commits_b = commit_hashes(b);
    let shared_commits: Vec<String> = commit_hashes(a)
        .into_iter()
        .filter(|h| commits_b.contains(h))
        .collect();
    if !shared_commits.is_empty() {
        out.push(format!("shared commit {}", shared_commits.join(", ")));
    }

    let tags = shared_tags(a, b);
    if !tags.is_empty() {
        out.push(format!("shared tags {}", tags.join(", ")));
    }
    out
}
