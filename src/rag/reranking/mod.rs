//! Local re-scoring of retrieved documents
//!
//! Standard-mode queries rerank the retrieved set with lightweight
//! heuristics before context building; forecasting queries skip this
//! and aggregate the full set.

pub mod scorer;

pub use scorer::{Reranker, RERANK_TOP_RESULTS};
