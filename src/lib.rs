//! Relationship and retrieval engine for short knowledge nodes.
//!
//! Tessera takes the decisions, progress notes, insights and questions a user has
//! captured, discovers how they relate, ranks them for retrieval, groups them into
//! topic clusters, and picks a diverse, importance-weighted subset to warm up a new
//! session. Storage belongs to the caller: every entry point takes slices of
//! [`Node`](knowledge::types::Node) and [`Edge`](knowledge::types::Edge) and returns
//! plain, serializable results.
//!
//! | Node type | Session weight |
//! |-----------|----------------|
//! | **Decision** | ×2.0 |
//! | **Question** | ×1.8 |
//! | **Insight** | ×1.5 |
//! | **Progress / Idea / Session** | ×1.0 |
//!
//! # Architecture
//!
//! - **Embeddings**: feature-hashed term frequencies (FNV-1a, 256 buckets by default),
//!   L2-normalized, fully deterministic
//! - **Relationships**: content, recency, and explicit-reference signals combined
//!   into a strength in `[0, 1]`, plus cue-based relation kinds
//! - **Clustering**: single-pass, order-dependent centroid assignment
//! - **Search**: a pluggable [`VectorIndex`](index::VectorIndex) (exact by default)
//!   re-ranked with tag co-occurrence
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`embedding`]: Text-to-vector hashing and similarity functions
//! - [`index`]: Nearest-neighbor index contract and the exact implementation
//! - [`knowledge`]: Relationships, clustering, context selection, tags, paths, search

pub mod config;
pub mod embedding;
pub mod index;
pub mod knowledge;
