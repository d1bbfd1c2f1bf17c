// Retrieval-augmented query pipeline for sales questions
//
// Components:
// - Classifier: standard vs. forecasting mode, optional date filter
// - Retrieval: one search call against the index collaborator
// - Reranking: heuristic scoring and top-5 truncation (standard mode)
// - Context Builder: per-product summary or time-series aggregation
// - Prompt Builder: fixed system templates + mode-specific user prompt
// - Response Parser: defensive JSON recovery ladder
// - Pipeline: end-to-end orchestration

pub mod classify;
pub mod context;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod reranking;
pub mod retrieval;

// Re-export key types
pub use classify::{classify, DateFilter, QueryClassification};
pub use context::ContextBuilder;
pub use parser::ResponseParser;
pub use pipeline::RagPipeline;
pub use prompt::PromptBuilder;
pub use reranking::Reranker;
pub use retrieval::{DocumentRetriever, InMemoryIndex, SearchIndex};
