//! Textual evidence blocks for the completion prompt
//!
//! Two mutually exclusive strategies, selected by query mode:
//!
//! - standard: per-product aggregation over the reranked top documents,
//!   headed by the date range of the full retrieved set so the model
//!   can answer meta-questions about coverage
//! - forecasting: monthly and yearly aggregation over the full
//!   retrieved set with year-over-year growth rates
//!
//! The output is a plain-text artifact for the model, not a UI; only
//! the wording and section headers need to stay consistent.

use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::types::EnrichedSale;

/// Per-product aggregate over the reranked set
struct ProductGroup {
    /// Attributes are taken from the group's first member
    representative: EnrichedSale,
    total_sales: f64,
    total_quantity: i64,
    margin_sum: f64,
    transaction_count: usize,
    min_date: DateTime<Utc>,
    max_date: DateTime<Utc>,
}

impl ProductGroup {
    fn avg_profit_margin(&self) -> f64 {
        self.margin_sum / self.transaction_count as f64
    }
}

/// Per-period aggregate for the time-series strategy
#[derive(Default)]
struct PeriodAggregate {
    total_sales: f64,
    total_quantity: i64,
    margin_sum: f64,
    transaction_count: usize,
}

impl PeriodAggregate {
    fn add(&mut self, doc: &EnrichedSale) {
        self.total_sales += doc.net_sales_amount();
        self.total_quantity += doc.sales_quantity as i64;
        self.margin_sum += doc.profit_margin();
        self.transaction_count += 1;
    }

    fn avg_profit_margin(&self) -> f64 {
        self.margin_sum / self.transaction_count as f64
    }
}

/// Renders retrieved documents into grounded context text
pub struct ContextBuilder;

impl ContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Standard-mode context: per-product summary of the reranked
    /// documents, headed by the coverage of the full retrieved set.
    pub fn build_product_summary(
        &self,
        ranked: &[EnrichedSale],
        retrieved: &[EnrichedSale],
    ) -> String {
        let mut out = String::new();

        if let Some((min_date, max_date)) = date_range(retrieved) {
            out.push_str("=== DATA TIME PERIOD ===\n");
            let _ = writeln!(
                out,
                "Date Range: {} to {}",
                min_date.format("%Y-%m-%d"),
                max_date.format("%Y-%m-%d")
            );
            let _ = writeln!(
                out,
                "This dataset contains {} sales transactions",
                retrieved.len()
            );
            out.push('\n');
        }

        out.push_str("=== PRODUCT SALES SUMMARY ===\n");
        for group in product_groups(ranked) {
            let product = &group.representative;
            let _ = writeln!(out, "Product: {}", product.product_name);
            let _ = writeln!(
                out,
                "  Manufacturer: {} ({})",
                product.manufacturer, product.brand_name
            );
            let _ = writeln!(
                out,
                "  Category: {}, Color: {}",
                product.class_name, product.color_name
            );
            let _ = writeln!(
                out,
                "  Transaction Dates: {} to {}",
                group.min_date.format("%Y-%m-%d"),
                group.max_date.format("%Y-%m-%d")
            );
            let _ = writeln!(out, "  Total Net Sales: ${:.2}", group.total_sales);
            let _ = writeln!(out, "  Total Quantity Sold: {} units", group.total_quantity);
            let _ = writeln!(
                out,
                "  Average Profit Margin: {:.1}%",
                group.avg_profit_margin()
            );
            let _ = writeln!(out, "  Number of Transactions: {}", group.transaction_count);
            out.push('\n');
        }

        out
    }

    /// Forecasting-mode context: monthly series, yearly summaries, and
    /// year-over-year growth over the full retrieved set.
    pub fn build_time_series(&self, documents: &[EnrichedSale]) -> String {
        let mut out = String::new();

        // BTreeMap keys keep both series in chronological order
        let mut monthly: BTreeMap<(i32, u32), PeriodAggregate> = BTreeMap::new();
        let mut yearly: BTreeMap<i32, PeriodAggregate> = BTreeMap::new();
        for doc in documents {
            monthly
                .entry((doc.date_key.year(), doc.date_key.month()))
                .or_default()
                .add(doc);
            yearly.entry(doc.date_key.year()).or_default().add(doc);
        }

        out.push_str("TIME SERIES DATA (Monthly Aggregations):\n");
        out.push_str("===========================================\n");
        for ((year, month), agg) in &monthly {
            let _ = writeln!(
                out,
                "Period: {}-{:02} ({} Month {})",
                year, month, year, month
            );
            let _ = writeln!(out, "  Total Sales: ${:.2}", agg.total_sales);
            let _ = writeln!(out, "  Total Quantity: {} units", agg.total_quantity);
            let _ = writeln!(
                out,
                "  Average Profit Margin: {:.1}%",
                agg.avg_profit_margin()
            );
            let _ = writeln!(out, "  Transactions: {}", agg.transaction_count);
            out.push('\n');
        }

        out.push('\n');
        out.push_str("YEARLY SUMMARIES:\n");
        out.push_str("=================\n");
        for (year, agg) in &yearly {
            let _ = writeln!(out, "Year: {}", year);
            let _ = writeln!(out, "  Total Annual Sales: ${:.2}", agg.total_sales);
            let _ = writeln!(out, "  Total Annual Quantity: {} units", agg.total_quantity);
            let _ = writeln!(
                out,
                "  Average Profit Margin: {:.1}%",
                agg.avg_profit_margin()
            );
            out.push('\n');
        }

        if yearly.len() > 1 {
            out.push_str("YEAR-OVER-YEAR GROWTH RATES:\n");
            out.push_str("=============================\n");
            let years: Vec<(&i32, &PeriodAggregate)> = yearly.iter().collect();
            for pair in years.windows(2) {
                let (prev_year, prev) = pair[0];
                let (curr_year, curr) = pair[1];
                // A zero base year would render as inf/NaN
                if prev.total_sales == 0.0 {
                    let _ = writeln!(out, "{} to {}: n/a growth", prev_year, curr_year);
                } else {
                    let growth =
                        (curr.total_sales - prev.total_sales) / prev.total_sales * 100.0;
                    let _ = writeln!(out, "{} to {}: {:.2}% growth", prev_year, curr_year, growth);
                }
                let _ = writeln!(
                    out,
                    "  Previous: ${:.2} -> Current: ${:.2}",
                    prev.total_sales, curr.total_sales
                );
                out.push('\n');
            }
        }

        out
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn date_range(documents: &[EnrichedSale]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let min = documents.iter().map(|d| d.date_key).min()?;
    let max = documents.iter().map(|d| d.date_key).max()?;
    Some((min, max))
}

/// Group documents by (productKey, productName), ordered by descending
/// total net sales
fn product_groups(documents: &[EnrichedSale]) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();

    for doc in documents {
        match groups.iter_mut().find(|g| {
            g.representative.product_key == doc.product_key
                && g.representative.product_name == doc.product_name
        }) {
            Some(group) => {
                group.total_sales += doc.net_sales_amount();
                group.total_quantity += doc.sales_quantity as i64;
                group.margin_sum += doc.profit_margin();
                group.transaction_count += 1;
                group.min_date = group.min_date.min(doc.date_key);
                group.max_date = group.max_date.max(doc.date_key);
            }
            None => groups.push(ProductGroup {
                representative: doc.clone(),
                total_sales: doc.net_sales_amount(),
                total_quantity: doc.sales_quantity as i64,
                margin_sum: doc.profit_margin(),
                transaction_count: 1,
                min_date: doc.date_key,
                max_date: doc.date_key,
            }),
        }
    }

    groups.sort_by(|a, b| {
        b.total_sales
            .partial_cmp(&a.total_sales)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(key: &str, product_key: i32, name: &str, amount: f64, year: i32, month: u32) -> EnrichedSale {
        EnrichedSale {
            sales_key: key.to_string(),
            date_key: Utc.with_ymd_and_hms(year, month, 15, 0, 0, 0).unwrap(),
            sales_quantity: 2,
            unit_cost: 60.0,
            unit_price: 100.0,
            sales_amount: amount,
            total_cost: 120.0,
            return_quantity: 0,
            return_amount: None,
            discount_quantity: None,
            discount_amount: None,
            product_key,
            product_name: name.to_string(),
            product_description: String::new(),
            manufacturer: "Contoso, Ltd".to_string(),
            brand_name: "Contoso".to_string(),
            class_name: "Regular".to_string(),
            style_name: String::new(),
            color_name: "Silver".to_string(),
            status: "On".to_string(),
            channel_key: 0,
            store_key: 0,
            promotion_key: 0,
            currency_key: 0,
            embedding: None,
        }
    }

    #[test]
    fn test_group_totals_equal_member_sums() {
        let docs = vec![
            doc("1", 1, "Camera", 100.0, 2008, 1),
            doc("2", 1, "Camera", 250.5, 2008, 2),
            doc("3", 2, "Laptop", 999.25, 2008, 3),
        ];

        let groups = product_groups(&docs);
        let group_total: f64 = groups.iter().map(|g| g.total_sales).sum();
        let doc_total: f64 = docs.iter().map(|d| d.net_sales_amount()).sum();
        assert_eq!(group_total, doc_total);

        let camera = groups
            .iter()
            .find(|g| g.representative.product_name == "Camera")
            .unwrap();
        assert_eq!(camera.total_sales, 350.5);
        assert_eq!(camera.transaction_count, 2);
    }

    #[test]
    fn test_groups_ordered_by_total_sales_descending() {
        let docs = vec![
            doc("1", 1, "Camera", 100.0, 2008, 1),
            doc("2", 2, "Laptop", 999.0, 2008, 1),
            doc("3", 3, "Cable", 10.0, 2008, 1),
        ];

        let groups = product_groups(&docs);
        let names: Vec<&str> = groups
            .iter()
            .map(|g| g.representative.product_name.as_str())
            .collect();
        assert_eq!(names, vec!["Laptop", "Camera", "Cable"]);
    }

    #[test]
    fn test_product_summary_header_covers_full_retrieved_set() {
        let retrieved = vec![
            doc("1", 1, "Camera", 100.0, 2007, 3),
            doc("2", 2, "Laptop", 200.0, 2009, 10),
            doc("3", 3, "Cable", 50.0, 2008, 6),
        ];
        // Only a subset survived reranking
        let ranked = vec![retrieved[1].clone()];

        let context = ContextBuilder::new().build_product_summary(&ranked, &retrieved);
        assert!(context.contains("=== DATA TIME PERIOD ==="));
        assert!(context.contains("Date Range: 2007-03-15 to 2009-10-15"));
        assert!(context.contains("This dataset contains 3 sales transactions"));
        assert!(context.contains("=== PRODUCT SALES SUMMARY ==="));
        assert!(context.contains("Product: Laptop"));
        assert!(!context.contains("Product: Camera"));
    }

    #[test]
    fn test_product_summary_fields() {
        let docs = vec![
            doc("1", 1, "Camera", 100.0, 2008, 1),
            doc("2", 1, "Camera", 200.0, 2008, 5),
        ];

        let context = ContextBuilder::new().build_product_summary(&docs, &docs);
        assert!(context.contains("Manufacturer: Contoso, Ltd (Contoso)"));
        assert!(context.contains("Category: Regular, Color: Silver"));
        assert!(context.contains("Transaction Dates: 2008-01-15 to 2008-05-15"));
        assert!(context.contains("Total Net Sales: $300.00"));
        assert!(context.contains("Total Quantity Sold: 4 units"));
        assert!(context.contains("Average Profit Margin: 40.0%"));
        assert!(context.contains("Number of Transactions: 2"));
    }

    #[test]
    fn test_time_series_sections_and_order() {
        let docs = vec![
            doc("1", 1, "Camera", 100.0, 2008, 2),
            doc("2", 1, "Camera", 150.0, 2007, 11),
            doc("3", 1, "Camera", 250.0, 2008, 2),
        ];

        let context = ContextBuilder::new().build_time_series(&docs);
        assert!(context.contains("TIME SERIES DATA (Monthly Aggregations):"));
        assert!(context.contains("YEARLY SUMMARIES:"));

        // Chronological month order
        let nov = context.find("Period: 2007-11").unwrap();
        let feb = context.find("Period: 2008-02").unwrap();
        assert!(nov < feb);

        // February 2008 aggregates both transactions
        assert!(context.contains("Period: 2008-02 (2008 Month 2)"));
        assert!(context.contains("Total Sales: $350.00"));
    }

    #[test]
    fn test_growth_rates_need_two_years() {
        let one_year = vec![doc("1", 1, "Camera", 100.0, 2008, 2)];
        let context = ContextBuilder::new().build_time_series(&one_year);
        assert!(!context.contains("YEAR-OVER-YEAR GROWTH RATES:"));

        let two_years = vec![
            doc("1", 1, "Camera", 100.0, 2007, 2),
            doc("2", 1, "Camera", 150.0, 2008, 2),
        ];
        let context = ContextBuilder::new().build_time_series(&two_years);
        assert!(context.contains("YEAR-OVER-YEAR GROWTH RATES:"));
        assert!(context.contains("2007 to 2008: 50.00% growth"));
        assert!(context.contains("Previous: $100.00 -> Current: $150.00"));
    }

    #[test]
    fn test_zero_base_year_growth_is_not_a_number_soup() {
        let docs = vec![
            doc("1", 1, "Camera", 0.0, 2007, 2),
            doc("2", 1, "Camera", 150.0, 2008, 2),
        ];
        let context = ContextBuilder::new().build_time_series(&docs);
        assert!(context.contains("2007 to 2008: n/a growth"));
        assert!(!context.contains("inf"));
        assert!(!context.contains("NaN"));
    }

    #[test]
    fn test_empty_input_renders_headers_only() {
        let context = ContextBuilder::new().build_product_summary(&[], &[]);
        assert!(!context.contains("=== DATA TIME PERIOD ==="));
        assert!(context.contains("=== PRODUCT SALES SUMMARY ==="));
    }
}
