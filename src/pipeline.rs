//! The combined search pipeline: fetch from every store, filter by
//! category, rank against the query, group into comparisons, and deal
//! out a store-fair offer list.

use crate::category::Category;
use crate::compare::build_comparison;
use crate::interleave::build_visible_offers;
use crate::model::{Offer, SearchReport};
use crate::rank::rank_and_filter;
use crate::stores::{collect_offers, StoreFetch};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Drops offers outside the requested category. `All` keeps everything.
pub fn filter_by_category(offers: Vec<Offer>, category: Category) -> Vec<Offer> {
    if category == Category::All {
        return offers;
    }

    offers.into_iter().filter(|offer| category.includes(offer.category)).collect()
}

/// Runs a comparison search across every configured store.
///
/// Store failures degrade to status entries in the report; only internal
/// errors surface as `Err`.
pub async fn run_search(
    fetchers: &[Arc<dyn StoreFetch>],
    query: &str,
    limit: usize,
    category: Category,
) -> Result<SearchReport> {
    let (raw_offers, stores) = collect_offers(fetchers, query, limit).await;
    let raw_offers_count = raw_offers.len();

    let in_category = filter_by_category(raw_offers, category);
    let ranked = rank_and_filter(in_category, query);
    let offers_count = ranked.len();

    let comparisons = build_comparison(&ranked, limit);
    let offers = build_visible_offers(&ranked, limit.saturating_mul(8));

    info!(
        "'{}': {} raw offers, {} ranked, {} comparisons",
        query,
        raw_offers_count,
        offers_count,
        comparisons.len()
    );

    Ok(SearchReport {
        query: query.to_string(),
        category,
        count: comparisons.len(),
        offers_count,
        raw_offers_count,
        stores,
        comparisons,
        offers,
    })
}
