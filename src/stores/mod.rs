//! Store clients and the concurrent fetch layer.

pub mod aldi;
pub mod client;
pub mod extract;
pub mod rapidapi;

pub use aldi::AldiFetcher;
pub use client::{ApiClient, ApiResponse};
pub use rapidapi::{RapidApiFetcher, StoreProfile};

use crate::config::Config;
use crate::model::{FetchOutcome, Offer, Store, StoreStatus};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for store product search - allows mocking the upstream APIs in tests.
#[async_trait]
pub trait StoreFetch: Send + Sync {
    /// The store this fetcher serves.
    fn store(&self) -> Store;

    /// Searches the store for products matching the query. Failures are
    /// reported inside the outcome, never as a panic or early return.
    async fn fetch(&self, query: &str, limit: usize) -> FetchOutcome;
}

/// Builds the production fetcher set. The order fixes the order raw
/// offers arrive in, which downstream grouping depends on.
pub fn default_fetchers(config: &Config) -> Result<Vec<Arc<dyn StoreFetch>>> {
    Ok(vec![
        Arc::new(RapidApiFetcher::new(config, StoreProfile::coles())?),
        Arc::new(RapidApiFetcher::new(config, StoreProfile::woolworths())?),
        Arc::new(AldiFetcher::new(config)?),
    ])
}

/// Runs every fetcher concurrently and settles them all.
///
/// A store that fails contributes its error (and any offers gathered
/// before the failure) instead of sinking the whole search.
pub async fn collect_offers(
    fetchers: &[Arc<dyn StoreFetch>],
    query: &str,
    limit: usize,
) -> (Vec<Offer>, BTreeMap<Store, StoreStatus>) {
    let outcomes = join_all(fetchers.iter().map(|fetcher| fetcher.fetch(query, limit))).await;

    let mut offers = Vec::new();
    let mut stores = BTreeMap::new();

    for outcome in outcomes {
        if let Some(error) = &outcome.error {
            warn!("{} search degraded: {}", outcome.store, error);
        }
        debug!("{} returned {} offers", outcome.store, outcome.offers.len());

        stores.insert(outcome.store, outcome.status());
        offers.extend(outcome.offers);
    }

    (offers, stores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchError;

    struct MockFetcher {
        store: Store,
        outcome: FetchOutcome,
    }

    #[async_trait]
    impl StoreFetch for MockFetcher {
        fn store(&self) -> Store {
            self.store
        }

        async fn fetch(&self, _query: &str, _limit: usize) -> FetchOutcome {
            self.outcome.clone()
        }
    }

    fn offer_named(store: Store, name: &str) -> Offer {
        Offer {
            store,
            product_name: name.to_string(),
            product_brand: "Unknown".to_string(),
            product_size: None,
            current_price: Some(1.0),
            currency: None,
            url: None,
            source: store.source_tag().to_string(),
            category: crate::category::Category::Other,
        }
    }

    #[tokio::test]
    async fn test_collect_keeps_fetcher_order() {
        let fetchers: Vec<Arc<dyn StoreFetch>> = vec![
            Arc::new(MockFetcher {
                store: Store::Coles,
                outcome: FetchOutcome::success(
                    Store::Coles,
                    vec![offer_named(Store::Coles, "first")],
                ),
            }),
            Arc::new(MockFetcher {
                store: Store::Woolworths,
                outcome: FetchOutcome::success(
                    Store::Woolworths,
                    vec![offer_named(Store::Woolworths, "second")],
                ),
            }),
        ];

        let (offers, stores) = collect_offers(&fetchers, "milk", 5).await;

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].product_name, "first");
        assert_eq!(offers[1].product_name, "second");
        assert!(stores[&Store::Coles].ok);
        assert!(stores[&Store::Woolworths].ok);
    }

    #[tokio::test]
    async fn test_collect_reports_failures_as_status() {
        let fetchers: Vec<Arc<dyn StoreFetch>> = vec![
            Arc::new(MockFetcher {
                store: Store::Coles,
                outcome: FetchOutcome::failure(
                    Store::Coles,
                    FetchError::MissingCredential(Store::Coles),
                    Vec::new(),
                ),
            }),
            Arc::new(MockFetcher {
                store: Store::Aldi,
                outcome: FetchOutcome::success(
                    Store::Aldi,
                    vec![offer_named(Store::Aldi, "bread")],
                ),
            }),
        ];

        let (offers, stores) = collect_offers(&fetchers, "bread", 5).await;

        assert_eq!(offers.len(), 1);
        assert!(!stores[&Store::Coles].ok);
        assert_eq!(
            stores[&Store::Coles].error.as_deref(),
            Some("Missing RAPIDAPI key for Coles")
        );
        assert!(stores[&Store::Aldi].ok);
        assert_eq!(stores[&Store::Aldi].error, None);
    }

    #[tokio::test]
    async fn test_collect_keeps_partial_offers_from_failed_store() {
        let fetchers: Vec<Arc<dyn StoreFetch>> = vec![Arc::new(MockFetcher {
            store: Store::Woolworths,
            outcome: FetchOutcome::failure(
                Store::Woolworths,
                FetchError::Upstream("Woolworths API failed".to_string()),
                vec![offer_named(Store::Woolworths, "partial")],
            ),
        })];

        let (offers, stores) = collect_offers(&fetchers, "milk", 5).await;

        assert_eq!(offers.len(), 1);
        assert!(!stores[&Store::Woolworths].ok);
    }

    #[tokio::test]
    async fn test_collect_with_no_fetchers() {
        let (offers, stores) = collect_offers(&[], "milk", 5).await;
        assert!(offers.is_empty());
        assert!(stores.is_empty());
    }
}
