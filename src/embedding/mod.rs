//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and the local [`HashingVectorizer`]
//! (hash-bucketed term frequencies, L2-normalized). Similarity helpers live in
//! [`similarity`].

pub mod hashing;
pub mod similarity;

pub use hashing::{tokenize, vectorize, HashingVectorizer};
pub use similarity::{cosine_similarity, dot};

/// Default number of dimensions for locally computed vectors.
pub const DEFAULT_DIMENSION: usize = 256;

/// Trait for embedding text into vectors.
///
/// Implementations are pure: the same text always produces the same vector.
/// All methods are synchronous.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Embed a batch of text strings. Implementations may override for batched work.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize;
}

/// Create the embedding provider described by config.
pub fn create_provider(config: &crate::config::EmbeddingConfig) -> Box<dyn EmbeddingProvider> {
    Box::new(HashingVectorizer::new(config.dimension))
}
