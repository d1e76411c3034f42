use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::relations::{classify, RelationshipScorer};
use super::tags::{normalize_tags, TagCooccurrence};
use super::types::{Node, NodeType, RelationKind};
use crate::embedding::EmbeddingProvider;
use crate::index::{ExactIndex, VectorIndex};

/// Bonus per requested (or co-occurring) tag present on a result.
const TAG_BONUS: f64 = 0.05;
/// Cap on the summed tag bonus.
const MAX_TAG_BONUS: f64 = 0.15;
/// Index candidates fetched per requested result, to leave room for re-ranking.
const CANDIDATE_FACTOR: usize = 3;
const PREVIEW_CHARS: usize = 80;

// ── Public types ──────────────────────────────────────────────────────────────

/// A single ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub preview: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_tags: Vec<String>,
}

/// A node ranked by relationship strength to some target node.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub preview: String,
    pub strength: f64,
    pub kind: RelationKind,
}

/// Search configuration knobs.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    /// Tags that boost results carrying them.
    pub tags: Vec<String>,
    /// How many co-occurring tags to add to `tags` (0 disables expansion).
    pub tag_expansion_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            tags: Vec::new(),
            tag_expansion_limit: 5,
        }
    }
}

/// Semantic search over a node set.
///
/// Holds the vector index it was built with; rebuild it when the node set changes.
pub struct NodeSearch<'p, I: VectorIndex = ExactIndex> {
    provider: &'p dyn EmbeddingProvider,
    index: I,
}

// ── Public API ────────────────────────────────────────────────────────────────

impl<'p> NodeSearch<'p, ExactIndex> {
    /// Index `nodes` in a fresh exact index sized to the provider.
    pub fn exact(provider: &'p dyn EmbeddingProvider, nodes: &[Node]) -> Self {
        Self::build(provider, nodes, ExactIndex::new(provider.dimensions()))
    }
}

impl<'p, I: VectorIndex> NodeSearch<'p, I> {
    /// Fill `index` with every node's vector.
    ///
    /// Nodes whose precomputed embedding has a different width than the index are
    /// left out by the index itself.
    pub fn build(provider: &'p dyn EmbeddingProvider, nodes: &[Node], mut index: I) -> Self {
        index.build(
            nodes
                .iter()
                .map(|n| (n.id.clone(), n.vector(provider)))
                .collect(),
        );
        tracing::debug!(indexed = index.len(), nodes = nodes.len(), "search index built");
        Self { provider, index }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Rank nodes for a free-text query: vector similarity plus a small bonus for
    /// each requested or co-occurring tag the node carries.
    pub fn search(
        &self,
        query: &str,
        nodes: &[Node],
        cooccurrence: &TagCooccurrence,
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        if options.limit == 0 {
            return Vec::new();
        }

        let mut boost_tags = normalize_tags(&options.tags);
        if options.tag_expansion_limit > 0 && !boost_tags.is_empty() {
            let expanded = cooccurrence.expand(&boost_tags, options.tag_expansion_limit);
            boost_tags.extend(expanded);
        }
        let boost_set: HashSet<&str> = boost_tags.iter().map(String::as_str).collect();

        let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let query_vector = self.provider.embed(query);
        let hits = self
            .index
            .search(&query_vector, options.limit * CANDIDATE_FACTOR);

        let mut results: Vec<SearchResult> = Vec::new();
        for hit in hits {
            let Some(node) = by_id.get(hit.id.as_str()) else {
                continue;
            };
            let matched_tags: Vec<String> = node
                .tags
                .iter()
                .filter(|t| boost_set.contains(t.as_str()))
                .cloned()
                .collect();
            let bonus = (TAG_BONUS * matched_tags.len() as f64).min(MAX_TAG_BONUS);
            let score = (f64::from(hit.score).clamp(0.0, 1.0) + bonus).clamp(0.0, 1.0);
            if score <= 0.0 {
                continue;
            }
            results.push(SearchResult {
                id: node.id.clone(),
                node_type: node.node_type,
                preview: truncate_preview(&node.content, PREVIEW_CHARS),
                score,
                matched_tags,
            });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(options.limit);
        results
    }
}

/// Rank every other node by relationship strength to `target_id`.
///
/// Returns an empty list when `target_id` is unknown.
pub fn related_nodes(
    target_id: &str,
    nodes: &[Node],
    scorer: &RelationshipScorer,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<RelatedNode> {
    let Some(target) = nodes.iter().find(|n| n.id == target_id) else {
        return Vec::new();
    };

    let mut related: Vec<RelatedNode> = nodes
        .iter()
        .filter(|n| n.id != target.id)
        .map(|other| {
            let factors = scorer.score(target, other, now);
            RelatedNode {
                id: other.id.clone(),
                node_type: other.node_type,
                preview: truncate_preview(&other.content, PREVIEW_CHARS),
                strength: factors.strength,
                kind: classify(target, other, &factors),
            }
        })
        .collect();

    related.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    related.truncate(limit);
    related
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Truncate content to max_chars characters, appending "..." if truncated.
pub(crate) fn truncate_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((end, _)) => format!("{}...", &content[..end]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingVectorizer;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn node(id: &str, content: &str) -> Node {
        Node::new(id, NodeType::Progress, content, now())
    }

    fn corpus() -> Vec<Node> {
        vec![
            node("git", "git commit capture hook").with_tags(["git", "hooks"]),
            node("boat", "sailboat hull specs").with_tags(["sailing"]),
            node("cli", "command line flags for the capture tool").with_tags(["cli"]),
        ]
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let provider = HashingVectorizer::new(256);
        let nodes = corpus();
        let search = NodeSearch::exact(&provider, &nodes);
        assert_eq!(search.index().len(), 3);

        let results = search.search(
            "git commit",
            &nodes,
            &TagCooccurrence::new(),
            &SearchOptions::default(),
        );
        assert_eq!(results[0].id, "git");
        assert!(results.iter().all(|r| r.id != "boat"));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_tag_boost_and_expansion() {
        let provider = HashingVectorizer::new(256);
        let nodes = corpus();
        let search = NodeSearch::exact(&provider, &nodes);
        let mut co = TagCooccurrence::new();
        co.record(&["cli", "hooks"]);

        let options = SearchOptions {
            tags: vec!["CLI".into()],
            ..SearchOptions::default()
        };
        let results = search.search("capture", &nodes, &co, &options);
        let cli = results.iter().find(|r| r.id == "cli").unwrap();
        let git = results.iter().find(|r| r.id == "git").unwrap();
        assert_eq!(cli.matched_tags, vec!["cli"]);
        // "hooks" co-occurs with "cli", so the git node is boosted too.
        assert_eq!(git.matched_tags, vec!["hooks"]);
    }

    #[test]
    fn test_search_limit_and_empty_query() {
        let provider = HashingVectorizer::new(256);
        let nodes = corpus();
        let search = NodeSearch::exact(&provider, &nodes);
        let options = SearchOptions {
            limit: 1,
            ..SearchOptions::default()
        };
        assert!(search.search("capture", &nodes, &TagCooccurrence::new(), &options).len() <= 1);
        assert!(search
            .search("", &nodes, &TagCooccurrence::new(), &SearchOptions::default())
            .is_empty());
    }

    #[test]
    fn test_mismatched_embeddings_are_not_indexed() {
        let provider = HashingVectorizer::new(256);
        let mut nodes = corpus();
        nodes[1].embedding = Some(vec![0.1; 1536]);
        let search = NodeSearch::exact(&provider, &nodes);
        assert_eq!(search.index().len(), 2);
    }

    #[test]
    fn test_related_nodes() {
        let scorer = RelationshipScorer::new(256, 30.0);
        let mut nodes = corpus();
        nodes.push(node("git2", "git commit capture retries").with_tags(["git"]));
        nodes[1].updated_at = now() - Duration::days(60);

        let related = related_nodes("git", &nodes, &scorer, now(), 2);
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].id, "git2");
        assert_eq!(related[0].kind, RelationKind::RelatesTo);
        assert!(related_nodes("missing", &nodes, &scorer, now(), 5).is_empty());
    }

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("short", 80), "short");
        assert_eq!(
            truncate_preview("a".repeat(100).as_str(), 80),
            format!("{}...", "a".repeat(80))
        );
        assert_eq!(truncate_preview("héllo wörld", 5), "héllo...");
    }
}
