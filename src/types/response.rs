//! Answer payload returned to the user-facing client
//!
//! Field names follow the wire contract consumed by the frontend:
//! `answer`, `chartData{chartType,title,labels,values}`, `success`,
//! `sourceDocuments`, `tokensUsed`.

use serde::{Deserialize, Serialize};

use crate::types::EnrichedSale;

/// Chart rendering hint chosen by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Comparisons (products, categories, manufacturers)
    Bar,
    /// Time series and forecasts
    Line,
    /// Proportions, at most 5-6 slices
    Pie,
}

impl ChartType {
    /// Parse a chart type leniently; unknown strings fall back to bar
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "line" => ChartType::Line,
            "pie" => ChartType::Pie,
            _ => ChartType::Bar,
        }
    }
}

/// Chart payload extracted from the model's JSON answer
///
/// Invariant: `labels.len() == values.len()`. Values are nullable so a
/// forecast series can carry gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub chart_type: ChartType,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl ChartData {
    /// Check the labels/values pairing invariant
    pub fn is_consistent(&self) -> bool {
        self.labels.len() == self.values.len()
    }
}

/// Response for one query, constructed fresh per request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub chart_data: Option<ChartData>,
    pub success: bool,
    #[serde(default)]
    pub source_documents: Vec<EnrichedSale>,
    #[serde(default)]
    pub tokens_used: u32,
}

impl QueryResponse {
    /// Successful response with no chart and no sources yet
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            chart_data: None,
            success: true,
            source_documents: Vec::new(),
            tokens_used: 0,
        }
    }

    /// Failure response; the only path where `success` is false
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            chart_data: None,
            success: false,
            source_documents: Vec::new(),
            tokens_used: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_type_wire_names() {
        assert_eq!(serde_json::to_string(&ChartType::Bar).unwrap(), "\"bar\"");
        assert_eq!(serde_json::to_string(&ChartType::Line).unwrap(), "\"line\"");
        assert_eq!(serde_json::to_string(&ChartType::Pie).unwrap(), "\"pie\"");
    }

    #[test]
    fn test_chart_type_lenient_parse() {
        assert_eq!(ChartType::parse_lenient("LINE"), ChartType::Line);
        assert_eq!(ChartType::parse_lenient(" pie "), ChartType::Pie);
        assert_eq!(ChartType::parse_lenient("histogram"), ChartType::Bar);
    }

    #[test]
    fn test_chart_data_consistency() {
        let chart = ChartData {
            chart_type: ChartType::Bar,
            title: "Top products".to_string(),
            labels: vec!["A".to_string(), "B".to_string()],
            values: vec![Some(10.0), None],
        };
        assert!(chart.is_consistent());
    }

    #[test]
    fn test_response_wire_names() {
        let response = QueryResponse::with_answer("hello");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("chartData").is_some());
        assert!(json.get("sourceDocuments").is_some());
        assert!(json.get("tokensUsed").is_some());
        assert_eq!(json["success"], serde_json::json!(true));
    }

    #[test]
    fn test_failure_response() {
        let response = QueryResponse::failure("boom");
        assert!(!response.success);
        assert_eq!(response.answer, "boom");
        assert!(response.chart_data.is_none());
    }
}
