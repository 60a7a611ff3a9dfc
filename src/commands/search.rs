//! Search command implementation.

use crate::category::Category;
use crate::config::Config;
use crate::format::Formatter;
use crate::pipeline::run_search;
use crate::stores::{default_fetchers, StoreFetch};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Executes a cross-store comparison search.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(
        &self,
        query: &str,
        limit: Option<usize>,
        category: Category,
    ) -> Result<String> {
        let fetchers =
            default_fetchers(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_fetchers(&fetchers, query, limit, category).await
    }

    /// Executes the search with provided fetchers (for testing).
    pub async fn execute_with_fetchers(
        &self,
        fetchers: &[Arc<dyn StoreFetch>],
        query: &str,
        limit: Option<usize>,
        category: Category,
    ) -> Result<String> {
        let limit = limit.unwrap_or(self.config.default_limit).clamp(1, 60);

        info!("Searching for: {}", query);

        let report = run_search(fetchers, query, limit, category).await?;

        info!(
            "Found {} comparison groups across {} ranked offers",
            report.count, report.offers_count
        );

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(&report))
    }
}
