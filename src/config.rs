//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::model::Store;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RapidAPI key for the Coles product API
    #[serde(default)]
    pub coles_api_key: Option<String>,

    /// RapidAPI key for the Woolworths product API
    #[serde(default)]
    pub woolworths_api_key: Option<String>,

    /// Request timeout for the RapidAPI storefronts in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Request timeout for the ALDI AU API in milliseconds
    #[serde(default = "default_aldi_timeout_ms")]
    pub aldi_timeout_ms: u64,

    /// Maximum search pages to walk per RapidAPI storefront
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Comparison groups returned when no limit is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Bind address for the HTTP server
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the HTTP server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_timeout_ms() -> u64 {
    6500
}

fn default_aldi_timeout_ms() -> u64 {
    7000
}

fn default_max_pages() -> u32 {
    3
}

fn default_limit() -> usize {
    15
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coles_api_key: None,
            woolworths_api_key: None,
            timeout_ms: default_timeout_ms(),
            aldi_timeout_ms: default_aldi_timeout_ms(),
            max_pages: default_max_pages(),
            default_limit: default_limit(),
            host: default_host(),
            port: default_port(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("grocer-compare").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. `RAPIDAPI_KEY` covers both
    /// storefronts; the store-specific variables win over it.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("RAPIDAPI_KEY") {
            if !key.is_empty() {
                self.coles_api_key = Some(key.clone());
                self.woolworths_api_key = Some(key);
            }
        }

        if let Ok(key) = std::env::var("RAPIDAPI_KEY_COLES") {
            if !key.is_empty() {
                self.coles_api_key = Some(key);
            }
        }

        if let Ok(key) = std::env::var("RAPIDAPI_KEY_WOOLWORTHS") {
            if !key.is_empty() {
                self.woolworths_api_key = Some(key);
            }
        }

        self
    }

    /// The credential for a store, if one is configured. ALDI needs none.
    pub fn api_key(&self, store: Store) -> Option<String> {
        let key = match store {
            Store::Coles => &self.coles_api_key,
            Store::Woolworths => &self.woolworths_api_key,
            Store::Aldi => return None,
        };

        key.as_deref().filter(|k| !k.is_empty()).map(String::from)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
