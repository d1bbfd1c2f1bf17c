//! Retrieval engine: one search call per query
//!
//! Predictive questions pull a wider slice of history than standard
//! ones; everything else about ranking is delegated to the index.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::rag::classify::DateFilter;
use crate::types::EnrichedSale;

/// Result count for standard questions
pub const STANDARD_TOP_RESULTS: usize = 10;

/// Result count for forecasting questions, which need broader history
/// for trend extraction
pub const PREDICTIVE_TOP_RESULTS: usize = 50;

/// External document search collaborator.
///
/// `filter`, when present, is the textual half-open date predicate
/// produced by the classifier (`dateKey ge <start> and dateKey lt <end>`).
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(
        &self,
        query: &str,
        top: usize,
        filter: Option<&str>,
    ) -> Result<Vec<EnrichedSale>>;
}

/// Issues the single retrieval call for a query
pub struct DocumentRetriever {
    index: Arc<dyn SearchIndex>,
    standard_top: usize,
    predictive_top: usize,
}

impl DocumentRetriever {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            standard_top: STANDARD_TOP_RESULTS,
            predictive_top: PREDICTIVE_TOP_RESULTS,
        }
    }

    /// Override the per-mode result counts (config-driven)
    pub fn with_limits(index: Arc<dyn SearchIndex>, standard_top: usize, predictive_top: usize) -> Self {
        Self {
            index,
            standard_top,
            predictive_top,
        }
    }

    /// Retrieve candidate documents for a question.
    ///
    /// An empty result is a valid outcome, not an error; the caller
    /// turns it into a "no data" terminal response.
    pub async fn retrieve(
        &self,
        question: &str,
        is_predictive: bool,
        date_filter: Option<&DateFilter>,
    ) -> Result<Vec<EnrichedSale>> {
        let top = if is_predictive {
            self.predictive_top
        } else {
            self.standard_top
        };

        let filter = date_filter.map(|f| f.expression());
        debug!(top, filter = filter.as_deref(), "searching index");

        let documents = self.index.search(question, top, filter.as_deref()).await?;
        info!(count = documents.len(), "retrieved documents");
        Ok(documents)
    }
}
