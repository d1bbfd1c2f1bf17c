//! Configuration management for salesbuddy
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.salesbuddy/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{RagError, Result};

/// Environment variable consulted when the config file carries no key
pub const API_KEY_ENV: &str = "SALESBUDDY_API_KEY";

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub rag: RagSettings,
    pub data: DataConfig,
}

/// Completion provider connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Retrieval size for standard questions
    pub standard_top: usize,
    /// Retrieval size for forecasting questions
    pub predictive_top: usize,
    /// Documents attached to the response as sources
    pub source_documents: usize,
}

/// Enriched document corpus location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to an enriched-sales JSON file (ETL sample output format)
    pub enriched_path: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            api_key: String::new(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            standard_top: 10,
            predictive_top: 50,
            source_documents: 3,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            enriched_path: "enriched_sales.json".to_string(),
        }
    }
}

impl LlmConfig {
    /// API key from the config file, falling back to the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the standard location or fall back to built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".salesbuddy").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            return Err(RagError::ConfigError(
                "llm.base_url must not be empty".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(RagError::ConfigError(
                "llm.model must not be empty".to_string(),
            ));
        }

        if self.rag.standard_top == 0 || self.rag.predictive_top == 0 {
            return Err(RagError::ConfigError(
                "retrieval sizes must be greater than 0".to_string(),
            ));
        }

        if self.rag.predictive_top < self.rag.standard_top {
            return Err(RagError::ConfigError(
                "rag.predictive_top must not be smaller than rag.standard_top".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rag.standard_top, 10);
        assert_eq!(config.rag.predictive_top, 50);
        assert_eq!(config.rag.source_documents, 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodel = \"deepseek-reasoner\"").unwrap();

        let config = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.llm.model, "deepseek-reasoner");
        assert_eq!(config.llm.base_url, "https://api.deepseek.com");
        assert_eq!(config.rag.standard_top, 10);
    }

    #[test]
    fn test_invalid_retrieval_sizes_rejected() {
        let mut config = Config::default();
        config.rag.predictive_top = 5;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Config::load_from_file(&PathBuf::from("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
