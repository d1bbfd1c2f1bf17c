//! Enriched sales document: one transaction joined with its product
//!
//! Produced once per extraction run by the enrichment join and indexed
//! by the external search service. Immutable for the lifetime of a
//! query; the pipeline never mutates it. Wire names are camelCase to
//! match the enriched-sample JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dimensionality of the optional dense embedding. The vector is opaque
/// to the pipeline; only the search collaborator uses it.
pub const EMBEDDING_DIM: usize = 384;

/// One sales transaction enriched with its product attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSale {
    // Sales facts
    pub sales_key: String,
    pub date_key: DateTime<Utc>,
    pub sales_quantity: i32,
    pub unit_cost: f64,
    pub unit_price: f64,
    pub sales_amount: f64,
    pub total_cost: f64,
    #[serde(default)]
    pub return_quantity: i32,
    #[serde(default)]
    pub return_amount: Option<f64>,
    #[serde(default)]
    pub discount_quantity: Option<i32>,
    #[serde(default)]
    pub discount_amount: Option<f64>,

    // Product facts
    pub product_key: i32,
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub style_name: String,
    #[serde(default)]
    pub color_name: String,
    #[serde(default)]
    pub status: String,

    // Foreign keys kept for downstream joins
    #[serde(default)]
    pub channel_key: i32,
    #[serde(default)]
    pub store_key: i32,
    #[serde(default)]
    pub promotion_key: i32,
    #[serde(default)]
    pub currency_key: i32,

    /// Dense vector for similarity ranking; never inspected here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl EnrichedSale {
    /// Profit margin as a percentage of the unit price.
    ///
    /// Computed on read, never stored. Zero when the unit price is not
    /// positive (avoids a division by zero on free or placeholder rows).
    pub fn profit_margin(&self) -> f64 {
        if self.unit_price > 0.0 {
            (self.unit_price - self.unit_cost) / self.unit_price * 100.0
        } else {
            0.0
        }
    }

    /// Sales amount net of returns and discounts
    pub fn net_sales_amount(&self) -> f64 {
        self.sales_amount - self.return_amount.unwrap_or(0.0) - self.discount_amount.unwrap_or(0.0)
    }

    /// Flattened text rendering used for full-text indexing and matching
    pub fn searchable_text(&self) -> String {
        format!(
            "Sale of {} by {} ({}). Product: {}. Category: {}, Style: {}, Color: {}. \
             Date: {}. Quantity: {} units at ${} each. Total sales: ${}. Status: {}.",
            self.product_name,
            self.manufacturer,
            self.brand_name,
            self.product_description,
            self.class_name,
            self.style_name,
            self.color_name,
            self.date_key.format("%Y-%m-%d"),
            self.sales_quantity,
            self.unit_price,
            self.sales_amount,
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_sale(sales_key: &str, product_key: i32, product_name: &str) -> EnrichedSale {
        EnrichedSale {
            sales_key: sales_key.to_string(),
            date_key: Utc.with_ymd_and_hms(2008, 6, 15, 0, 0, 0).unwrap(),
            sales_quantity: 4,
            unit_cost: 120.0,
            unit_price: 200.0,
            sales_amount: 800.0,
            total_cost: 480.0,
            return_quantity: 0,
            return_amount: None,
            discount_quantity: None,
            discount_amount: None,
            product_key,
            product_name: product_name.to_string(),
            product_description: "A test product".to_string(),
            manufacturer: "Contoso, Ltd".to_string(),
            brand_name: "Contoso".to_string(),
            class_name: "Regular".to_string(),
            style_name: "Standard".to_string(),
            color_name: "Silver".to_string(),
            status: "On".to_string(),
            channel_key: 1,
            store_key: 1,
            promotion_key: 1,
            currency_key: 1,
            embedding: None,
        }
    }

    #[test]
    fn test_profit_margin() {
        let doc = sample_sale("s1", 1, "Widget");
        // (200 - 120) / 200 * 100 = 40%
        assert!((doc.profit_margin() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_profit_margin_zero_price() {
        let mut doc = sample_sale("s1", 1, "Widget");
        doc.unit_price = 0.0;
        assert_eq!(doc.profit_margin(), 0.0);
    }

    #[test]
    fn test_net_sales_amount_defaults() {
        let doc = sample_sale("s1", 1, "Widget");
        assert_eq!(doc.net_sales_amount(), 800.0);
    }

    #[test]
    fn test_net_sales_amount_with_returns_and_discounts() {
        let mut doc = sample_sale("s1", 1, "Widget");
        doc.return_amount = Some(100.0);
        doc.discount_amount = Some(50.0);
        assert_eq!(doc.net_sales_amount(), 650.0);
    }

    #[test]
    fn test_searchable_text_contains_key_fields() {
        let doc = sample_sale("s1", 1, "Proseware Laptop19");
        let text = doc.searchable_text();
        assert!(text.contains("Proseware Laptop19"));
        assert!(text.contains("Contoso, Ltd"));
        assert!(text.contains("2008-06-15"));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let doc = sample_sale("s1", 7, "Widget");
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("salesKey").is_some());
        assert!(json.get("productKey").is_some());
        assert!(json.get("brandName").is_some());
        // Absent embedding is omitted, not null
        assert!(json.get("embedding").is_none());
    }

    #[test]
    fn test_deserialize_partial_record() {
        // Optional fields may be missing in older sample files
        let json = r#"{
            "salesKey": "42",
            "dateKey": "2007-11-03T00:00:00Z",
            "salesQuantity": 2,
            "unitCost": 5.0,
            "unitPrice": 10.0,
            "salesAmount": 20.0,
            "totalCost": 10.0,
            "productKey": 9,
            "productName": "Cable"
        }"#;
        let doc: EnrichedSale = serde_json::from_str(json).unwrap();
        assert_eq!(doc.sales_key, "42");
        assert_eq!(doc.return_quantity, 0);
        assert!(doc.return_amount.is_none());
        assert_eq!(doc.net_sales_amount(), 20.0);
    }
}
