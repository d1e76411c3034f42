//! Tag normalization and co-occurrence expansion.
//!
//! [`TagCooccurrence`] is an explicitly owned table: build one per node set (or keep
//! one and [`record`](TagCooccurrence::record) new nodes into it) and pass it to the
//! code that needs expansion.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Deserializer};

use super::types::Node;

/// Trim, lowercase and deduplicate tags, keeping first-seen order and dropping empties.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    out
}

/// Serde hook that normalizes tags as they are read.
pub(crate) fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_tags(raw))
}

/// Directed tag → tag co-occurrence counts.
#[derive(Debug, Clone, Default)]
pub struct TagCooccurrence {
    counts: HashMap<String, HashMap<String, u32>>,
}

impl TagCooccurrence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh table from every node's tags.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut table = Self::new();
        for node in nodes {
            table.record(&node.tags);
        }
        tracing::debug!(tags = table.counts.len(), "tag co-occurrence table built");
        table
    }

    /// Count every ordered pair of distinct tags in one tag set.
    pub fn record<S: AsRef<str>>(&mut self, tags: &[S]) {
        let tags = normalize_tags(tags);
        for a in &tags {
            for b in &tags {
                if a == b {
                    continue;
                }
                *self
                    .counts
                    .entry(a.clone())
                    .or_default()
                    .entry(b.clone())
                    .or_insert(0) += 1;
            }
        }
    }

    /// How often `b` appeared alongside `a`.
    pub fn count(&self, a: &str, b: &str) -> u32 {
        self.counts
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Tags most often seen with any of `base`, excluding `base` itself.
    ///
    /// Counts are summed across base tags; ties are broken alphabetically.
    pub fn expand<S: AsRef<str>>(&self, base: &[S], limit: usize) -> Vec<String> {
        let base = normalize_tags(base);
        let base_set: HashSet<&str> = base.iter().map(String::as_str).collect();

        let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
        for tag in &base {
            let Some(row) = self.counts.get(tag) else {
                continue;
            };
            for (other, count) in row {
                if base_set.contains(other.as_str()) {
                    continue;
                }
                *totals.entry(other.as_str()).or_insert(0) += count;
            }
        }

        let mut ranked: Vec<(&str, u32)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(tag, _)| tag.to_string())
            .collect()
    }
}
