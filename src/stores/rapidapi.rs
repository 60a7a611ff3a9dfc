//! Coles and Woolworths product search through their RapidAPI gateways.
//!
//! Both storefronts expose the same search shape behind different hosts,
//! so one fetcher drives them through a [`StoreProfile`].

use super::client::{extract_error_message, ApiClient};
use super::extract::{normalize_offer, search_results};
use super::StoreFetch;
use crate::config::Config;
use crate::model::{FetchError, FetchOutcome, Offer, Store};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Connection profile for one RapidAPI storefront.
#[derive(Debug, Clone)]
pub struct StoreProfile {
    pub store: Store,
    pub host: &'static str,
    pub search_path: &'static str,
    pub error_fallback: &'static str,
}

impl StoreProfile {
    pub fn coles() -> Self {
        Self {
            store: Store::Coles,
            host: "coles-product-price-api.p.rapidapi.com",
            search_path: "/coles/product-search/",
            error_fallback: "Coles API failed",
        }
    }

    pub fn woolworths() -> Self {
        Self {
            store: Store::Woolworths,
            host: "woolworths-products-api.p.rapidapi.com",
            search_path: "/woolworths/product-search/",
            error_fallback: "Woolworths API failed",
        }
    }
}

/// Paging fetcher for the RapidAPI storefronts.
pub struct RapidApiFetcher {
    client: ApiClient,
    profile: StoreProfile,
    api_key: Option<String>,
    timeout: Duration,
    max_pages: u32,
    base_url: Option<String>,
}

impl RapidApiFetcher {
    pub fn new(config: &Config, profile: StoreProfile) -> Result<Self> {
        Self::with_base_url(config, profile, None)
    }

    /// Creates a fetcher pointed at a custom base URL (used in tests).
    pub fn with_base_url(
        config: &Config,
        profile: StoreProfile,
        base_url: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new()?,
            api_key: config.api_key(profile.store),
            timeout: Duration::from_millis(config.timeout_ms),
            max_pages: config.max_pages,
            profile,
            base_url,
        })
    }

    fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}", self.profile.host),
        }
    }

    fn search_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}{}?query={}&page={}",
            self.base_url(),
            self.profile.search_path,
            urlencoding::encode(query),
            page
        )
    }
}

/// Offers without a URL are keyed on name, size and price instead.
fn dedup_key(offer: &Offer) -> String {
    match &offer.url {
        Some(url) => url.clone(),
        None => format!(
            "{}|{}|{}",
            offer.product_name,
            offer.product_size.as_deref().unwrap_or("null"),
            offer.current_price.map_or_else(|| "null".to_string(), |p| p.to_string())
        ),
    }
}

#[async_trait]
impl StoreFetch for RapidApiFetcher {
    fn store(&self) -> Store {
        self.profile.store
    }

    async fn fetch(&self, query: &str, limit: usize) -> FetchOutcome {
        let store = self.profile.store;

        let Some(api_key) = self.api_key.as_deref() else {
            return FetchOutcome::failure(store, FetchError::MissingCredential(store), Vec::new());
        };

        info!("Searching {}: {}", store, query);

        // Over-fetch so ranking and grouping have enough raw material.
        let target_count = (limit * 2).max(20);
        let mut found: Vec<Offer> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 1..=self.max_pages {
            let url = self.search_url(query, page);
            let headers =
                [("x-rapidapi-host", self.profile.host), ("x-rapidapi-key", api_key)];

            let response = match self.client.get_json(&url, &headers, self.timeout).await {
                Ok(response) => response,
                Err(error) => return FetchOutcome::failure(store, error, found),
            };

            if !response.ok {
                let message = extract_error_message(&response.data, self.profile.error_fallback);
                return FetchOutcome::failure(store, FetchError::Upstream(message), found);
            }

            let items = search_results(&response.data);
            if items.is_empty() {
                debug!("{} page {} empty, stopping", store, page);
                break;
            }

            for item in items {
                let offer = normalize_offer(item, store);
                if !seen.insert(dedup_key(&offer)) {
                    continue;
                }
                found.push(offer);
                if found.len() >= target_count {
                    break;
                }
            }

            if found.len() >= target_count {
                debug!("{} reached target of {} offers", store, target_count);
                break;
            }
        }

        FetchOutcome::success(store, found)
    }
}
