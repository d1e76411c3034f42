//! Core knowledge engine: relationship scoring, clustering, context selection,
//! tag expansion, path search, and ranked retrieval over caller-supplied nodes.
//!
//! Nothing here performs I/O or keeps hidden state. Every function takes the nodes
//! and edges it works on and returns plain data.

pub mod clustering;
pub mod context;
pub mod paths;
pub mod relations;
pub mod search;
pub mod tags;
pub mod types;
