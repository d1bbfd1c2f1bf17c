//! Document retrieval against the external search collaborator
//!
//! The pipeline owns only the parameterization (result count, optional
//! date filter); ranking belongs to the collaborator behind the
//! `SearchIndex` trait.

pub mod engine;
pub mod inmemory;

pub use engine::{DocumentRetriever, SearchIndex, PREDICTIVE_TOP_RESULTS, STANDARD_TOP_RESULTS};
pub use inmemory::InMemoryIndex;
