//! Relevance scorer for retrieved sales documents
//!
//! Scores combine question/field keyword hits, transaction recency,
//! sales magnitude, and profitability. The output is deduplicated and
//! capped at five documents, trading recall for prompt-size control
//! and answer determinism.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::types::EnrichedSale;

/// Fixed cap on the reranked set
pub const RERANK_TOP_RESULTS: usize = 5;

/// Document paired with its relevance score; exists only during ordering
struct ScoredDocument {
    document: EnrichedSale,
    relevance_score: f64,
}

/// Heuristic reranker for standard-mode queries
pub struct Reranker {
    top_n: usize,
    /// Recency bonuses decay relative to this instant
    reference_time: DateTime<Utc>,
}

impl Reranker {
    pub fn new() -> Self {
        Self {
            top_n: RERANK_TOP_RESULTS,
            reference_time: Utc::now(),
        }
    }

    /// Fixed reference time, for deterministic scoring in tests
    pub fn with_reference_time(reference_time: DateTime<Utc>) -> Self {
        Self {
            top_n: RERANK_TOP_RESULTS,
            reference_time,
        }
    }

    /// Score, order, deduplicate, and truncate the retrieved set.
    ///
    /// Ordering is descending by (score, net sales amount); duplicate
    /// transaction keys keep their first occurrence.
    pub fn rerank(&self, documents: Vec<EnrichedSale>, question: &str) -> Vec<EnrichedSale> {
        let lower_question = question.to_lowercase();

        let mut scored: Vec<ScoredDocument> = documents
            .into_iter()
            .map(|doc| {
                let relevance_score = self.relevance_score(&doc, &lower_question);
                ScoredDocument {
                    document: doc,
                    relevance_score,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.document
                        .net_sales_amount()
                        .partial_cmp(&a.document.net_sales_amount())
                        .unwrap_or(Ordering::Equal)
                })
        });

        let mut seen = HashSet::new();
        let ranked: Vec<EnrichedSale> = scored
            .into_iter()
            .filter(|s| seen.insert(s.document.sales_key.clone()))
            .take(self.top_n)
            .map(|s| s.document)
            .collect();

        debug!(count = ranked.len(), "reranked documents");
        ranked
    }

    /// Relevance heuristic for a single document
    fn relevance_score(&self, doc: &EnrichedSale, lower_question: &str) -> f64 {
        let mut score = 0.0;

        // Full-value keyword hits against the question
        let keywords = [
            doc.product_name.to_lowercase(),
            doc.manufacturer.to_lowercase(),
            doc.brand_name.to_lowercase(),
            doc.class_name.to_lowercase(),
        ];
        for keyword in &keywords {
            if lower_question.contains(keyword.as_str()) {
                score += 10.0;
            }
        }

        // Recency: linear decay to zero over a year
        let days_since = (self.reference_time - doc.date_key).num_seconds() as f64 / 86_400.0;
        score += (5.0 - days_since / 365.0).max(0.0);

        // Sales magnitude
        score += doc.net_sales_amount().max(1.0).log10() * 2.0;

        // Profitability
        score += (doc.profit_margin() / 10.0).max(0.0);

        score
    }
}

impl Default for Reranker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(key: &str, name: &str, sales_amount: f64) -> EnrichedSale {
        EnrichedSale {
            sales_key: key.to_string(),
            date_key: Utc.with_ymd_and_hms(2008, 6, 15, 0, 0, 0).unwrap(),
            sales_quantity: 1,
            unit_cost: 60.0,
            unit_price: 100.0,
            sales_amount,
            total_cost: 60.0,
            return_quantity: 0,
            return_amount: None,
            discount_quantity: None,
            discount_amount: None,
            product_key: 1,
            product_name: name.to_string(),
            product_description: String::new(),
            manufacturer: "Contoso, Ltd".to_string(),
            brand_name: "Contoso".to_string(),
            class_name: "Regular".to_string(),
            style_name: String::new(),
            color_name: String::new(),
            status: "On".to_string(),
            channel_key: 0,
            store_key: 0,
            promotion_key: 0,
            currency_key: 0,
            embedding: None,
        }
    }

    fn reranker() -> Reranker {
        Reranker::with_reference_time(Utc.with_ymd_and_hms(2009, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_keyword_match_outranks_magnitude() {
        let docs = vec![
            doc("1", "Desktop PC", 5_000.0),
            doc("2", "Camera Telephoto Lens", 100.0),
        ];

        let ranked = reranker().rerank(docs, "how are camera telephoto lens sales doing?");
        assert_eq!(ranked[0].sales_key, "2");
    }

    #[test]
    fn test_ties_break_by_net_sales() {
        let docs = vec![doc("1", "Widget", 100.0), doc("2", "Widget", 900.0)];

        // Same product attributes and date; only magnitude differs, and
        // the magnitude bonus also favors the bigger transaction.
        let ranked = reranker().rerank(docs, "widget sales");
        assert_eq!(ranked[0].sales_key, "2");
    }

    #[test]
    fn test_duplicates_removed_by_identity() {
        let docs = vec![doc("1", "Widget", 100.0), doc("1", "Widget", 100.0)];

        let ranked = reranker().rerank(docs, "widget");
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_truncates_to_five() {
        let docs = (0..12).map(|i| doc(&i.to_string(), "Widget", 100.0)).collect();

        let ranked = reranker().rerank(docs, "widget");
        assert_eq!(ranked.len(), RERANK_TOP_RESULTS);
    }

    #[test]
    fn test_recency_bonus_prefers_newer() {
        let mut old = doc("1", "Widget", 100.0);
        old.date_key = Utc.with_ymd_and_hms(2007, 1, 1, 0, 0, 0).unwrap();
        let mut new = doc("2", "Widget", 100.0);
        new.date_key = Utc.with_ymd_and_hms(2008, 12, 1, 0, 0, 0).unwrap();

        let ranked = reranker().rerank(vec![old, new], "unrelated question");
        assert_eq!(ranked[0].sales_key, "2");
    }

    #[test]
    fn test_empty_input() {
        let ranked = reranker().rerank(Vec::new(), "anything");
        assert!(ranked.is_empty());
    }
}
