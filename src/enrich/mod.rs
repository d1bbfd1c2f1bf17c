//! Enrichment join: fact sales ⋈ product catalog
//!
//! Produces the `EnrichedSale` documents the pipeline retrieves over.
//! Runs once per extraction; sales rows with no matching product are
//! skipped rather than failing the run. Also loads an already-enriched
//! corpus from the JSON sample format the extraction writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::errors::{RagError, Result};
use crate::types::{EnrichedSale, EMBEDDING_DIM};

/// One row of the transactional fact table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub sales_key: i64,
    pub date_key: DateTime<Utc>,
    pub product_key: i32,
    pub channel_key: i32,
    pub store_key: i32,
    pub promotion_key: i32,
    pub currency_key: i32,
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
}

/// One row of the reference product catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
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
}

/// Join sales facts against the product catalog.
///
/// Rows whose product key has no catalog entry are excluded, not
/// treated as an error.
pub fn join(sales: Vec<SalesRecord>, products: &[Product]) -> Vec<EnrichedSale> {
    let catalog: HashMap<i32, &Product> = products.iter().map(|p| (p.product_key, p)).collect();

    let total = sales.len();
    let enriched: Vec<EnrichedSale> = sales
        .into_iter()
        .filter_map(|sale| {
            let product = catalog.get(&sale.product_key)?;
            Some(EnrichedSale {
                sales_key: sale.sales_key.to_string(),
                date_key: sale.date_key,
                sales_quantity: sale.sales_quantity,
                unit_cost: sale.unit_cost,
                unit_price: sale.unit_price,
                sales_amount: sale.sales_amount,
                total_cost: sale.total_cost,
                return_quantity: sale.return_quantity,
                return_amount: sale.return_amount,
                discount_quantity: sale.discount_quantity,
                discount_amount: sale.discount_amount,
                product_key: sale.product_key,
                product_name: product.product_name.clone(),
                product_description: product.product_description.clone(),
                manufacturer: product.manufacturer.clone(),
                brand_name: product.brand_name.clone(),
                class_name: product.class_name.clone(),
                style_name: product.style_name.clone(),
                color_name: product.color_name.clone(),
                status: product.status.clone(),
                channel_key: sale.channel_key,
                store_key: sale.store_key,
                promotion_key: sale.promotion_key,
                currency_key: sale.currency_key,
                embedding: None,
            })
        })
        .collect();

    let skipped = total - enriched.len();
    if skipped > 0 {
        warn!(skipped, "sales rows without a matching product were excluded");
    }
    info!(records = enriched.len(), "enrichment join completed");

    enriched
}

/// Load an already-enriched corpus from a JSON file.
///
/// Embeddings with the wrong dimensionality are stripped (treated as
/// absent) rather than failing the load.
pub fn load_enriched(path: &Path) -> Result<Vec<EnrichedSale>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RagError::EnrichmentError(format!("cannot read {}: {}", path.display(), e))
    })?;
    let mut documents: Vec<EnrichedSale> = serde_json::from_str(&contents)?;

    let mut stripped = 0usize;
    for doc in &mut documents {
        if doc
            .embedding
            .as_ref()
            .is_some_and(|e| e.len() != EMBEDDING_DIM)
        {
            doc.embedding = None;
            stripped += 1;
        }
    }
    if stripped > 0 {
        warn!(stripped, "embeddings with unexpected dimensions were dropped");
    }

    info!(
        records = documents.len(),
        path = %path.display(),
        "loaded enriched corpus"
    );
    Ok(documents)
}
