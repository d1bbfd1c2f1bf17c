//! salesbuddy - grounded Q&A over sales transactions
//!
//! Answers natural-language questions about a fixed corpus of sales
//! transactions: retrieve relevant enriched records, build a grounded
//! textual context, call a completion provider under a strict JSON
//! contract, and recover a usable answer even when the model's output
//! is malformed.

pub mod config;
pub mod enrich;
pub mod errors;
pub mod llm;
pub mod rag;
pub mod types;

pub mod cli;

// Re-export commonly used types
pub use errors::{RagError, Result};
pub use rag::RagPipeline;
pub use types::{ChartData, ChartType, EnrichedSale, QueryResponse};
