//! Session warmup context selection.
//!
//! Picks a bounded set of nodes to inject at the start of a session. Bursty,
//! repetitive workstreams produce many near-identical progress notes; left to a plain
//! recency sort they crowd out the sparse entries that matter (decisions, blockers,
//! open questions). Selection therefore runs in stages:
//!
//! 1. Score each node: declared importance × type boost × tag boosts, times an
//!    exponential recency weight (`exp(-hours / 24)`).
//! 2. Reserve a quota of slots for high-priority nodes and fill it first.
//! 3. Fill the rest greedily, trading score against diversity from what is
//!    already selected.
//! 4. Backfill by recency if diversity constraints left slots empty.
//! 5. Cluster everything left out so its volume still shows up as summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::clustering::SimilarityClustering;
use super::types::{Importance, Node, NodeType};
use crate::config::SessionConfig;
use crate::embedding::{cosine_similarity, vectorize};

/// Workstream bucket for nodes without a `ws:` tag.
pub const GENERAL_WORKSTREAM: &str = "general";

const WORKSTREAM_PREFIX: &str = "ws:";
const BLOCKER_TAG: &str = "blocker";
const BLOCKER_BOOST: f64 = 2.5;
const CHORE_TAG_FRAGMENTS: &[&str] = &["lint", "format", "fix"];
const CHORE_PENALTY: f64 = 0.6;
const TEMPORAL_SCALE_HOURS: f64 = 24.0;
/// Workstreams smaller than this are never flagged high-volume.
const MIN_HIGH_VOLUME_NODES: usize = 3;
const SUMMARY_KEYWORD_LIMIT: usize = 5;
const LABEL_KEYWORDS: usize = 3;

/// Why a node made it into the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Filled from the high-priority quota.
    Priority,
    /// Chosen for its blend of score and diversity.
    Diverse,
    /// Added by recency after diversity constraints ran out of candidates.
    Backfill,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedNode {
    pub node: Node,
    pub score: f64,
    pub reason: SelectionReason,
}

/// Aggregate view of nodes left out of the selection.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    /// e.g. `"4 related items: lint, eslint, config"`.
    pub label: String,
    pub member_ids: Vec<String>,
    pub keywords: Vec<String>,
    pub coherence: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionDiagnostics {
    pub total_nodes: usize,
    pub workstream_count: usize,
    pub high_volume_workstreams: Vec<String>,
    pub priority_quota: usize,
    pub priority_selected: usize,
    pub backfilled: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    /// Selected nodes in selection order.
    pub selected: Vec<SelectedNode>,
    pub summaries: Vec<ClusterSummary>,
    pub diagnostics: SessionDiagnostics,
}

/// Importance × type × tag weight for a node.
pub fn importance_weight(node: &Node) -> f64 {
    let base = match node.importance {
        Importance::Low => 0.5,
        Importance::Medium => 1.5,
        Importance::High => 3.0,
    };
    let type_boost = match node.node_type {
        NodeType::Decision => 2.0,
        NodeType::Question => 1.8,
        NodeType::Insight => 1.5,
        NodeType::Progress | NodeType::Idea | NodeType::Session => 1.0,
    };
    let tag_boost = node.tags.iter().fold(1.0, |acc, tag| {
        let mut factor = acc;
        if tag == BLOCKER_TAG {
            factor *= BLOCKER_BOOST;
        }
        if CHORE_TAG_FRAGMENTS.iter().any(|frag| tag.contains(frag)) {
            factor *= CHORE_PENALTY;
        }
        factor
    });
    base * type_boost * tag_boost
}

/// `exp(-hours_since_update / 24)`: 1.0 for a node updated now, about 0.5 after
/// 16.6 hours.
pub fn temporal_weight(node: &Node, now: DateTime<Utc>) -> f64 {
    (-node.age_hours(now) / TEMPORAL_SCALE_HOURS).exp()
}

/// The node's first `ws:` tag, or [`GENERAL_WORKSTREAM`].
pub fn workstream_of(node: &Node) -> &str {
    node.tags
        .iter()
        .find(|t| t.starts_with(WORKSTREAM_PREFIX))
        .map(String::as_str)
        .unwrap_or(GENERAL_WORKSTREAM)
}

/// Decisions, questions, insights, blockers and high-importance nodes.
pub fn is_high_priority(node: &Node) -> bool {
    matches!(
        node.node_type,
        NodeType::Decision | NodeType::Question | NodeType::Insight
    ) || node.has_tag(BLOCKER_TAG)
        || node.importance == Importance::High
}

/// Selects a diverse, importance-weighted subset of nodes for session warmup.
#[derive(Debug, Clone)]
pub struct SessionContextSelector {
    config: SessionConfig,
    dimension: usize,
}

impl SessionContextSelector {
    pub fn new(config: SessionConfig, dimension: usize) -> Self {
        Self { config, dimension }
    }

    /// Slots reserved for high-priority nodes.
    pub fn priority_quota(&self) -> usize {
        let target = self.config.target_count;
        let scaled = (target as f64 * self.config.priority_quota_ratio).floor() as usize;
        scaled.max(self.config.min_priority_quota).min(target)
    }

    /// Select up to `target_count` nodes as of `now`.
    ///
    /// Deterministic: the same nodes in the same order with the same `now` always
    /// produce the same context.
    pub fn select(&self, nodes: &[Node], now: DateTime<Utc>) -> SessionContext {
        let target = self.config.target_count;
        let vectors: Vec<Vec<f32>> = nodes
            .iter()
            .map(|n| vectorize(&n.content, self.dimension))
            .collect();
        let scores: Vec<f64> = nodes
            .iter()
            .map(|n| importance_weight(n) * temporal_weight(n, now))
            .collect();

        let (workstream_count, high_volume_workstreams) = self.workstreams(nodes, &vectors);

        let (mut priority, mut pool): (Vec<usize>, Vec<usize>) =
            (0..nodes.len()).partition(|&i| is_high_priority(&nodes[i]));
        sort_by_score(&mut priority, &scores);

        let quota = self.priority_quota();
        let mut selection: Vec<(usize, SelectionReason)> = Vec::with_capacity(target);
        let overflow = priority.split_off(quota.min(priority.len()));
        selection.extend(priority.into_iter().map(|i| (i, SelectionReason::Priority)));
        let priority_selected = selection.len();

        pool.extend(overflow);
        sort_by_score(&mut pool, &scores);
        self.fill_diverse(&mut selection, &mut pool, &scores, &vectors);

        // Backfill by recency from whatever is still unselected.
        let before_backfill = selection.len();
        if selection.len() < target && !pool.is_empty() {
            pool.sort_by(|&a, &b| nodes[b].updated_at.cmp(&nodes[a].updated_at));
            let take = (target - selection.len()).min(pool.len());
            selection.extend(pool.drain(..take).map(|i| (i, SelectionReason::Backfill)));
        }
        let backfilled = selection.len() - before_backfill;

        let summaries = self.summarize(pool.iter().map(|&i| &nodes[i]));

        tracing::info!(
            total = nodes.len(),
            selected = selection.len(),
            priority = priority_selected,
            backfilled,
            summaries = summaries.len(),
            "session context selected"
        );
        if !high_volume_workstreams.is_empty() {
            tracing::debug!(workstreams = ?high_volume_workstreams, "high-volume workstreams");
        }

        SessionContext {
            selected: selection
                .into_iter()
                .map(|(i, reason)| SelectedNode {
                    node: nodes[i].clone(),
                    score: scores[i],
                    reason,
                })
                .collect(),
            summaries,
            diagnostics: SessionDiagnostics {
                total_nodes: nodes.len(),
                workstream_count,
                high_volume_workstreams,
                priority_quota: quota,
                priority_selected,
                backfilled,
            },
        }
    }

    /// Greedy score/diversity fill from `pool` (sorted by score) into `selection`.
    /// Picked candidates are removed from `pool`.
    fn fill_diverse(
        &self,
        selection: &mut Vec<(usize, SelectionReason)>,
        pool: &mut Vec<usize>,
        scores: &[f64],
        vectors: &[Vec<f32>],
    ) {
        let target = self.config.target_count;
        let max_score = pool.iter().map(|&i| scores[i]).fold(0.0f64, f64::max);
        let scale = if max_score > 0.0 { max_score } else { 1.0 };

        while selection.len() < target && !pool.is_empty() {
            let unfilled = target - selection.len();
            let required = if unfilled * 2 < target {
                self.config.relaxed_diversity_threshold
            } else {
                self.config.diversity_threshold
            };

            let mut best: Option<(usize, f64)> = None;
            for (pos, &candidate) in pool.iter().enumerate() {
                let max_sim = selection
                    .iter()
                    .map(|&(s, _)| f64::from(cosine_similarity(&vectors[candidate], &vectors[s])))
                    .fold(0.0f64, f64::max);
                let diversity = (1.0 - max_sim).clamp(0.0, 1.0);
                if diversity < required {
                    continue;
                }
                let value = self.config.importance_weight * (scores[candidate] / scale)
                    + self.config.diversity_weight * diversity;
                if best.map_or(true, |(_, v)| value > v) {
                    best = Some((pos, value));
                }
            }

            let Some((pos, _)) = best else {
                break;
            };
            let picked = pool.remove(pos);
            selection.push((picked, SelectionReason::Diverse));
        }
    }

    /// Count workstreams and flag the high-volume ones (sorted by label).
    fn workstreams(&self, nodes: &[Node], vectors: &[Vec<f32>]) -> (usize, Vec<String>) {
        let mut buckets: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, node) in nodes.iter().enumerate() {
            buckets.entry(workstream_of(node)).or_default().push(i);
        }

        let high_volume = buckets
            .iter()
            .filter(|(_, members)| self.is_high_volume(members, vectors))
            .map(|(label, _)| label.to_string())
            .collect();
        (buckets.len(), high_volume)
    }

    /// More than half of all member pairs are near-duplicates.
    fn is_high_volume(&self, members: &[usize], vectors: &[Vec<f32>]) -> bool {
        if members.len() < MIN_HIGH_VOLUME_NODES {
            return false;
        }
        let mut pairs = 0usize;
        let mut similar = 0usize;
        for (x, &a) in members.iter().enumerate() {
            for &b in &members[x + 1..] {
                pairs += 1;
                let sim = f64::from(cosine_similarity(&vectors[a], &vectors[b]));
                if sim >= self.config.high_volume_threshold {
                    similar += 1;
                }
            }
        }
        similar * 2 > pairs
    }

    /// Cluster left-out nodes into labelled summaries, largest first.
    fn summarize<'a>(&self, left_out: impl IntoIterator<Item = &'a Node>) -> Vec<ClusterSummary> {
        let clustering = SimilarityClustering::new(
            self.config.summary_cluster_threshold,
            SUMMARY_KEYWORD_LIMIT,
            self.dimension,
        );
        let mut summaries: Vec<ClusterSummary> = clustering
            .cluster(left_out)
            .into_iter()
            .map(|cluster| {
                let mut label = format!("{} related items", cluster.len());
                let shown: Vec<&str> = cluster
                    .keywords
                    .iter()
                    .take(LABEL_KEYWORDS)
                    .map(String::as_str)
                    .collect();
                if !shown.is_empty() {
                    label.push_str(": ");
                    label.push_str(&shown.join(", "));
                }
                ClusterSummary {
                    label,
                    member_ids: cluster.member_ids,
                    keywords: cluster.keywords,
                    coherence: cluster.coherence,
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.member_ids.len().cmp(&a.member_ids.len()));
        summaries
    }
}

/// Sort indices by descending score, keeping input order on ties.
fn sort_by_score(indices: &mut [usize], scores: &[f64]) {
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
