//! ALDI AU public product search.
//!
//! Unlike the RapidAPI storefronts this endpoint needs no credentials, but
//! it only accepts a fixed ladder of page sizes and paginates by offset.

use super::client::{extract_error_message, ApiClient, ApiResponse};
use super::extract::{normalize_offer, search_results};
use super::StoreFetch;
use crate::config::Config;
use crate::model::{FetchError, FetchOutcome, Store};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

const ALDI_API_BASE: &str = "https://api.aldi.com.au";
const ALDI_USER_AGENT: &str = "grocer-compare/0.1 (+https://localhost)";

/// Page sizes the ALDI endpoint accepts.
pub const ALDI_ALLOWED_LIMITS: [u32; 7] = [12, 16, 24, 30, 32, 48, 60];

/// Rounds a requested page size up to the nearest accepted value.
/// Out-of-range or unparseable requests land on the extremes.
pub fn sanitize_aldi_limit(requested: f64) -> u32 {
    let wanted = if requested.is_finite() { requested.clamp(1.0, 60.0) } else { 12.0 };

    for allowed in ALDI_ALLOWED_LIMITS {
        if wanted <= f64::from(allowed) {
            return allowed;
        }
    }

    60
}

pub struct AldiFetcher {
    client: ApiClient,
    timeout: Duration,
    base_url: Option<String>,
}

impl AldiFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a fetcher pointed at a custom base URL (used in tests).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new()?,
            timeout: Duration::from_millis(config.aldi_timeout_ms),
            base_url,
        })
    }

    fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| ALDI_API_BASE.to_string())
    }

    /// Fetches one raw search page. The comparison path and the ALDI
    /// passthrough endpoint both go through here.
    pub async fn search_page(
        &self,
        query: &str,
        limit: f64,
        offset: u32,
    ) -> Result<ApiResponse, FetchError> {
        let mut url = format!(
            "{}/v3/product-search?limit={}&offset={}",
            self.base_url(),
            sanitize_aldi_limit(limit),
            offset
        );

        let trimmed = query.trim();
        if !trimmed.is_empty() {
            url.push_str("&q=");
            url.push_str(&urlencoding::encode(trimmed));
        }

        let headers =
            [("Accept", "application/json"), ("User-Agent", ALDI_USER_AGENT)];
        self.client.get_json(&url, &headers, self.timeout).await
    }
}

#[async_trait]
impl StoreFetch for AldiFetcher {
    fn store(&self) -> Store {
        Store::Aldi
    }

    async fn fetch(&self, query: &str, limit: usize) -> FetchOutcome {
        let store = Store::Aldi;

        info!("Searching {}: {}", store, query);

        let requested = (limit * 2).max(12) as f64;
        let response = match self.search_page(query, requested, 0).await {
            Ok(response) => response,
            Err(error) => return FetchOutcome::failure(store, error, Vec::new()),
        };

        if !response.ok {
            let message = extract_error_message(&response.data, "ALDI AU API failed");
            return FetchOutcome::failure(store, FetchError::Upstream(message), Vec::new());
        }

        let offers = search_results(&response.data)
            .iter()
            .map(|item| normalize_offer(item, store))
            .filter(|offer| {
                !offer.product_name.is_empty()
                    && (offer.current_price.is_some() || offer.url.is_some())
            })
            .collect();

        FetchOutcome::success(store, offers)
    }
}
