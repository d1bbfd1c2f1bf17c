//! Core data contracts for the sales Q&A system
//!
//! - `EnrichedSale`: one sales transaction joined with its product,
//!   the unit of retrieval and context building
//! - `ChartData` / `QueryResponse`: the structured answer payload
//!   returned to the user-facing client

pub mod document;
pub mod response;

pub use document::{EnrichedSale, EMBEDDING_DIM};
pub use response::{ChartData, ChartType, QueryResponse};
