//! Command-line argument parsing for salesbuddy

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// salesbuddy - Ask natural-language questions about your sales data
#[derive(Parser, Debug)]
#[command(name = "salesbuddy")]
#[command(version)]
#[command(about = "Ask natural-language questions about your sales data", long_about = None)]
pub struct Args {
    /// Question to answer
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Path to the enriched sales corpus (JSON)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Completion model override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Verbosity level: default (warn), -v (info), -vv (debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display current configuration
    Config,

    /// Join raw sales and product JSON files into an enriched corpus
    Enrich {
        /// Sales fact rows (JSON array)
        sales: PathBuf,
        /// Product catalog rows (JSON array)
        products: PathBuf,
        /// Output path for the enriched corpus
        #[arg(short, long, default_value = "enriched_sales.json")]
        output: PathBuf,
    },
}

impl Args {
    /// Log filter directive for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "salesbuddy=warn",
            1 => "salesbuddy=info",
            _ => "salesbuddy=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_positional() {
        let args = Args::parse_from(["salesbuddy", "total sales in 2008"]);
        assert_eq!(args.question.as_deref(), Some("total sales in 2008"));
        assert!(args.command.is_none());
    }

    #[test]
    fn test_enrich_subcommand() {
        let args = Args::parse_from(["salesbuddy", "enrich", "sales.json", "products.json"]);
        match args.command {
            Some(Commands::Enrich { output, .. }) => {
                assert_eq!(output, PathBuf::from("enriched_sales.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = Args::parse_from(["salesbuddy", "-vv", "q"]);
        assert_eq!(args.log_filter(), "salesbuddy=debug");
    }
}
