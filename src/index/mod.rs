//! Nearest-neighbor search over `(id, vector)` pairs.
//!
//! [`VectorIndex`] is the contract callers program against: ordering by descending
//! score, silently ignored dimension mismatches on insert, and empty results for a
//! query of the wrong dimension. [`ExactIndex`] fulfils it by brute force; a graph
//! index can replace it without touching callers. [`SharedIndex`] adds the
//! single-writer / multi-reader locking a multi-threaded host needs.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::embedding::dot;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    /// Dot product with the query; cosine similarity for unit vectors.
    pub score: f32,
}

/// Trait for vector indexes.
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored vector has.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the contents with `items`. Vectors of the wrong dimension are skipped.
    fn build(&mut self, items: Vec<(String, Vec<f32>)>);

    /// Insert or replace one vector. A vector of the wrong dimension is ignored.
    fn add(&mut self, id: String, vector: Vec<f32>);

    /// Up to `k` hits, best first. Empty when the query has the wrong dimension.
    fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit>;
}

/// Exhaustive dot-product index. O(n) per search.
#[derive(Debug, Clone)]
pub struct ExactIndex {
    dimension: usize,
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl ExactIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ids: Vec::new(),
            vectors: Vec::new(),
        }
    }

    pub fn with_items(dimension: usize, items: Vec<(String, Vec<f32>)>) -> Self {
        let mut index = Self::new(dimension);
        index.build(items);
        index
    }
}

impl VectorIndex for ExactIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn build(&mut self, items: Vec<(String, Vec<f32>)>) {
        self.ids.clear();
        self.vectors.clear();
        let offered = items.len();
        for (id, vector) in items {
            self.add(id, vector);
        }
        if self.len() < offered {
            tracing::debug!(
                offered,
                stored = self.len(),
                dimension = self.dimension,
                "skipped vectors with mismatched dimension"
            );
        }
    }

    fn add(&mut self, id: String, vector: Vec<f32>) {
        if vector.len() != self.dimension {
            return;
        }
        match self.ids.iter().position(|existing| *existing == id) {
            Some(pos) => self.vectors[pos] = vector,
            None => {
                self.ids.push(id);
                self.vectors.push(vector);
            }
        }
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if query.len() != self.dimension || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, dot(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| SearchHit {
                id: self.ids[i].clone(),
                score,
            })
            .collect()
    }
}

/// Cloneable handle sharing one index between threads.
///
/// Writers take the lock exclusively, so a search never sees a half-written vector.
/// A search that runs before a concurrent `add` simply misses that item.
pub struct SharedIndex<I: VectorIndex> {
    inner: Arc<RwLock<I>>,
}

impl<I: VectorIndex> Clone for SharedIndex<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: VectorIndex> SharedIndex<I> {
    pub fn new(index: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn dimension(&self) -> usize {
        self.inner.read().dimension()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn build(&self, items: Vec<(String, Vec<f32>)>) {
        self.inner.write().build(items);
    }

    pub fn add(&self, id: String, vector: Vec<f32>) {
        self.inner.write().add(id, vector);
    }

    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        self.inner.read().search(query, k)
    }
}
