//! Incremental similarity clustering.
//!
//! A single pass over the input: each node joins the existing cluster whose centroid
//! it most resembles, or founds a new one. The result depends on input order, and
//! that is part of the contract: callers that reorder nodes get different clusters.

use std::collections::HashMap;

use serde::Serialize;

use super::types::Node;
use crate::config::ClusteringConfig;
use crate::embedding::similarity::mean_vector;
use crate::embedding::{cosine_similarity, tokenize, vectorize};

/// Tag occurrences count this many times a content token when ranking keywords.
const TAG_KEYWORD_WEIGHT: usize = 2;

/// Shortest token (in chars) considered a keyword.
const MIN_KEYWORD_CHARS: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "are", "was", "were",
    "has", "have", "had", "not", "but", "all", "any", "can", "will", "would", "should",
    "could", "its", "our", "out", "about", "after", "before", "then", "than", "there",
    "their", "them", "they", "when", "what", "which", "while", "who", "how", "also",
    "just", "now", "new", "use", "used", "using", "via", "per", "been", "being", "does",
    "did", "done", "some", "more", "most", "only", "over", "such", "very", "you", "your",
];

/// A group of mutually similar nodes.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    /// Position in formation order, e.g. `cluster-0`.
    pub id: String,
    /// Member node IDs in assignment order.
    pub member_ids: Vec<String>,
    /// Mean of the member content vectors.
    #[serde(skip)]
    pub centroid: Vec<f32>,
    /// Mean pairwise similarity of members; 1.0 for a singleton.
    pub coherence: f64,
    /// Member with the highest summed similarity to the others.
    pub center_id: String,
    pub keywords: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

/// Order-dependent single-pass clustering over node content.
#[derive(Debug, Clone)]
pub struct SimilarityClustering {
    threshold: f64,
    keyword_limit: usize,
    dimension: usize,
}

/// Cluster under construction: member positions plus current centroid.
struct Forming {
    members: Vec<usize>,
    centroid: Vec<f32>,
}

impl SimilarityClustering {
    pub fn new(threshold: f64, keyword_limit: usize, dimension: usize) -> Self {
        Self {
            threshold,
            keyword_limit,
            dimension,
        }
    }

    pub fn from_config(config: &ClusteringConfig, dimension: usize) -> Self {
        Self::new(config.similarity_threshold, config.keyword_limit, dimension)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Cluster nodes in the order given. Clusters come back sorted by descending
    /// coherence; clusters with equal coherence keep formation order.
    pub fn cluster<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> Vec<Cluster> {
        let nodes: Vec<&Node> = nodes.into_iter().collect();
        let vectors: Vec<Vec<f32>> = nodes
            .iter()
            .map(|n| vectorize(&n.content, self.dimension))
            .collect();

        let mut forming: Vec<Forming> = Vec::new();
        for (i, vector) in vectors.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (c, cluster) in forming.iter().enumerate() {
                if cluster.centroid.len() != vector.len() {
                    continue;
                }
                let sim = f64::from(cosine_similarity(vector, &cluster.centroid));
                if best.map_or(true, |(_, s)| sim > s) {
                    best = Some((c, sim));
                }
            }

            match best {
                Some((c, sim)) if sim >= self.threshold => {
                    let cluster = &mut forming[c];
                    cluster.members.push(i);
                    cluster.centroid =
                        mean_vector(cluster.members.iter().map(|&m| vectors[m].as_slice()));
                }
                _ => forming.push(Forming {
                    members: vec![i],
                    centroid: vector.clone(),
                }),
            }
        }

        let mut clusters: Vec<Cluster> = forming
            .into_iter()
            .enumerate()
            .map(|(n, f)| self.finish(n, f, &nodes, &vectors))
            .collect();
        clusters.sort_by(|a, b| {
            b.coherence
                .partial_cmp(&a.coherence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            nodes = nodes.len(),
            clusters = clusters.len(),
            threshold = self.threshold,
            "clustering complete"
        );
        clusters
    }

    fn finish(
        &self,
        n: usize,
        forming: Forming,
        nodes: &[&Node],
        vectors: &[Vec<f32>],
    ) -> Cluster {
        let members = &forming.members;
        let size = members.len();

        // Summed similarity of each member to every other member.
        let mut totals = vec![0.0f64; size];
        let mut pair_sum = 0.0f64;
        for x in 0..size {
            for y in (x + 1)..size {
                let sim = f64::from(cosine_similarity(&vectors[members[x]], &vectors[members[y]]));
                totals[x] += sim;
                totals[y] += sim;
                pair_sum += sim;
            }
        }

        let coherence = if size < 2 {
            1.0
        } else {
            let pairs = (size * (size - 1) / 2) as f64;
            (pair_sum / pairs).clamp(0.0, 1.0)
        };

        let mut center = 0usize;
        for (x, total) in totals.iter().enumerate() {
            if *total > totals[center] {
                center = x;
            }
        }

        let member_nodes: Vec<&Node> = members.iter().map(|&m| nodes[m]).collect();
        Cluster {
            id: format!("cluster-{n}"),
            member_ids: member_nodes.iter().map(|node| node.id.clone()).collect(),
            centroid: forming.centroid,
            coherence,
            center_id: member_nodes[center].id.clone(),
            keywords: extract_keywords(&member_nodes, self.keyword_limit),
        }
    }
}

/// Most frequent meaningful terms across nodes.
///
/// Content tokens count once per occurrence and whole tags count double. Short tokens,
/// numbers and stopwords are skipped. Ties keep first-seen order.
pub fn extract_keywords(nodes: &[&Node], limit: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    let mut bump = |term: String, weight: usize| {
        if let Some(count) = counts.get_mut(&term) {
            *count += weight;
        } else {
            counts.insert(term.clone(), weight);
            order.push(term);
        }
    };

    for node in nodes {
        for token in tokenize(&node.content) {
            if is_keyword(&token) {
                bump(token, 1);
            }
        }
        for tag in &node.tags {
            bump(tag.clone(), TAG_KEYWORD_WEIGHT);
        }
    }

    let mut ranked: Vec<(usize, &String)> = order.iter().enumerate().collect();
    ranked.sort_by(|a, b| counts[b.1].cmp(&counts[a.1]).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, term)| term.clone())
        .collect()
}

fn is_keyword(token: &str) -> bool {
    token.chars().count() >= MIN_KEYWORD_CHARS
        && !token.chars().all(|c| c.is_numeric())
        && !STOPWORDS.contains(&token)
}
