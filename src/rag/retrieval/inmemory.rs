//! In-memory search index over an enriched document corpus
//!
//! A deterministic term-overlap stand-in for the hosted search service,
//! used by the CLI and the tests. It evaluates exactly the filter
//! grammar the classifier emits; anything else is rejected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::errors::{RagError, Result};
use crate::rag::retrieval::SearchIndex;
use crate::types::EnrichedSale;

/// Query terms shorter than this carry no signal ("in", "of", "the")
const MIN_TERM_LEN: usize = 4;

/// Term-overlap index over a fixed corpus
pub struct InMemoryIndex {
    documents: Vec<EnrichedSale>,
}

impl InMemoryIndex {
    pub fn new(documents: Vec<EnrichedSale>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Count of query terms found in the document's searchable text
    fn overlap_score(text: &str, terms: &[&str]) -> usize {
        terms.iter().filter(|term| text.contains(*term)).count()
    }
}

/// Parse `dateKey ge <ts> and dateKey lt <ts>` into a half-open range
fn parse_filter(filter: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let unsupported = || RagError::FilterError(filter.to_string());

    let (ge_part, lt_part) = filter.split_once(" and ").ok_or_else(unsupported)?;
    let start = ge_part
        .strip_prefix("dateKey ge ")
        .ok_or_else(unsupported)?;
    let end = lt_part.strip_prefix("dateKey lt ").ok_or_else(unsupported)?;

    let start = DateTime::parse_from_rfc3339(start)
        .map_err(|_| unsupported())?
        .with_timezone(&Utc);
    let end = DateTime::parse_from_rfc3339(end)
        .map_err(|_| unsupported())?
        .with_timezone(&Utc);

    Ok((start, end))
}

#[async_trait]
impl SearchIndex for InMemoryIndex {
    async fn search(
        &self,
        query: &str,
        top: usize,
        filter: Option<&str>,
    ) -> Result<Vec<EnrichedSale>> {
        let range = filter.map(parse_filter).transpose()?;

        let lower = query.to_lowercase();
        let terms: Vec<&str> = lower
            .split_whitespace()
            .filter(|t| t.len() >= MIN_TERM_LEN)
            .collect();

        let mut scored: Vec<(usize, &EnrichedSale)> = self
            .documents
            .iter()
            .filter(|doc| match range {
                Some((start, end)) => doc.date_key >= start && doc.date_key < end,
                None => true,
            })
            .map(|doc| {
                let text = doc.searchable_text().to_lowercase();
                (Self::overlap_score(&text, &terms), doc)
            })
            // Without usable terms every in-range document qualifies
            .filter(|(score, _)| *score > 0 || terms.is_empty())
            .collect();

        scored.sort_by(|a, b| match b.0.cmp(&a.0) {
            Ordering::Equal => b.1.date_key.cmp(&a.1.date_key),
            other => other,
        });
        scored.truncate(top);

        Ok(scored.into_iter().map(|(_, doc)| doc.clone()).collect())
    }
}
