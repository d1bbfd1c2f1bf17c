//! salesbuddy - CLI entry point

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use salesbuddy::cli::{Args, Commands};
use salesbuddy::config::Config;
use salesbuddy::enrich;
use salesbuddy::llm::LlmApiClient;
use salesbuddy::rag::{DocumentRetriever, InMemoryIndex, RagPipeline};
use salesbuddy::types::QueryResponse;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_target(false)
        .init();

    let mut config = Config::load(args.config.clone())?;
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }

    match &args.command {
        Some(Commands::Config) => {
            show_config(&config)?;
            Ok(())
        }
        Some(Commands::Enrich {
            sales,
            products,
            output,
        }) => run_enrich(sales, products, output),
        None => {
            let question = args.question.clone().unwrap_or_default();
            // Input errors are rejected here, before the pipeline runs
            if question.trim().is_empty() {
                bail!("please provide a question, e.g. salesbuddy \"total sales in 2008\"");
            }
            run_query(&config, &args, &question).await
        }
    }
}

async fn run_query(config: &Config, args: &Args, question: &str) -> Result<()> {
    let data_path = args
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.enriched_path));
    let documents =
        enrich::load_enriched(&data_path).context("failed to load the enriched corpus")?;

    let index = Arc::new(InMemoryIndex::new(documents));
    tracing::info!(documents = index.len(), "search index ready");
    let retriever =
        DocumentRetriever::with_limits(index.clone(), config.rag.standard_top, config.rag.predictive_top);
    let completion = Arc::new(LlmApiClient::new(&config.llm)?);

    let pipeline = RagPipeline::new(index, completion)
        .with_retriever(retriever)
        .with_source_limit(config.rag.source_documents);
    let response = pipeline.query(question).await;

    render_response(&response);
    Ok(())
}

fn run_enrich(sales: &PathBuf, products: &PathBuf, output: &PathBuf) -> Result<()> {
    let sales_rows: Vec<enrich::SalesRecord> =
        serde_json::from_str(&std::fs::read_to_string(sales)?)
            .context("failed to parse sales rows")?;
    let product_rows: Vec<enrich::Product> =
        serde_json::from_str(&std::fs::read_to_string(products)?)
            .context("failed to parse product rows")?;

    let enriched = enrich::join(sales_rows, &product_rows);
    std::fs::write(output, serde_json::to_string_pretty(&enriched)?)?;

    println!(
        "{} {} enriched records written to {}",
        "✓".green(),
        enriched.len(),
        output.display()
    );
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    let mut printable = config.clone();
    if !printable.llm.api_key.is_empty() {
        printable.llm.api_key = "***".to_string();
    }
    println!("{}", toml::to_string_pretty(&printable)?);
    Ok(())
}

fn render_response(response: &QueryResponse) {
    if !response.success {
        eprintln!("{} {}", "error:".red().bold(), response.answer);
        return;
    }

    println!("{}", response.answer);

    if let Some(chart) = &response.chart_data {
        println!();
        println!(
            "{} {:?} - {}",
            "chart:".cyan().bold(),
            chart.chart_type,
            chart.title
        );
        for (label, value) in chart.labels.iter().zip(chart.values.iter()) {
            match value {
                Some(v) => println!("  {label}: {v:.2}"),
                None => println!("  {label}: -"),
            }
        }
    }

    if !response.source_documents.is_empty() {
        println!();
        println!("{}", "sources:".cyan().bold());
        for doc in &response.source_documents {
            println!(
                "  {} {} ({}, {})",
                doc.sales_key,
                doc.product_name,
                doc.manufacturer,
                doc.date_key.format("%Y-%m-%d")
            );
        }
    }

    println!();
    println!("{} {}", "tokens used:".dimmed(), response.tokens_used);
}
