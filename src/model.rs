//! Data models for stores, offers, comparisons and fetch outcomes.

use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported grocery stores.
///
/// Declaration order is alphabetical; `Ord` drives the round-robin order
/// of interleaved results and the key order of the per-store status map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Store {
    Aldi,
    Coles,
    Woolworths,
}

impl Store {
    /// Returns the display name for this store.
    pub fn name(&self) -> &'static str {
        match self {
            Store::Aldi => "Aldi",
            Store::Coles => "Coles",
            Store::Woolworths => "Woolworths",
        }
    }

    /// Returns the source tag attached to offers from this store.
    pub fn source_tag(&self) -> &'static str {
        match self {
            Store::Aldi => "aldi-au-public-api",
            Store::Coles => "coles-rapidapi",
            Store::Woolworths => "woolworths-rapidapi",
        }
    }

    /// Returns all supported stores.
    pub fn all() -> &'static [Store] {
        &[Store::Aldi, Store::Coles, Store::Woolworths]
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Store {
    type Err = StoreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aldi" => Ok(Store::Aldi),
            "coles" => Ok(Store::Coles),
            "woolworths" | "woolies" => Ok(Store::Woolworths),
            _ => Err(StoreParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreParseError(String);

impl fmt::Display for StoreParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown store '{}'. Valid stores: aldi, coles, woolworths", self.0)
    }
}

impl std::error::Error for StoreParseError {}

/// A normalized product offer from one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Store that listed the offer
    pub store: Store,
    /// Product name ("Unknown" when the upstream gives none)
    pub product_name: String,
    /// Brand name ("Unknown" when the upstream gives none)
    pub product_brand: String,
    /// Pack size text, e.g. "2L" or "500g"
    pub product_size: Option<String>,
    /// Current price, finite when present
    pub current_price: Option<f64>,
    /// Currency code
    pub currency: Option<String>,
    /// Product page URL
    pub url: Option<String>,
    /// Which upstream API produced the offer
    pub source: String,
    /// Classified category, never the `all` sentinel
    pub category: Category,
}

impl Offer {
    /// Returns the text searched when ranking and classifying: name,
    /// brand, and size when present.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.product_name,
            self.product_brand,
            self.product_size.as_deref().unwrap_or("")
        )
    }

    /// Price used for ordering; offers without one sort last.
    pub fn sort_price(&self) -> f64 {
        self.current_price.unwrap_or(f64::INFINITY)
    }
}

/// An offer that passed relevance ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedOffer {
    #[serde(flatten)]
    pub offer: Offer,
    /// Heuristic relevance score, always non-negative
    pub relevance_score: i64,
}

/// Per-store outcome annotation in a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub ok: bool,
    /// Failure description; serialized as null for healthy stores
    pub error: Option<String>,
}

/// Offers for the same product grouped across stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonGroup {
    /// Match key the group was formed on
    pub key: String,
    /// Identity fields from the first offer seen for this key
    pub product_name: String,
    pub product_brand: String,
    pub product_size: Option<String>,
    /// Member offers, cheapest first
    pub offers: Vec<RankedOffer>,
    /// Cheapest priced member, if any member has a price
    pub best_offer: Option<RankedOffer>,
    /// Spread between the dearest and cheapest priced members
    pub savings: Option<f64>,
}

/// Complete payload for one comparison search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub query: String,
    pub category: Category,
    /// Number of comparison groups
    pub count: usize,
    /// Offers that survived ranking
    pub offers_count: usize,
    /// Offers collected before filtering
    pub raw_offers_count: usize,
    pub stores: BTreeMap<Store, StoreStatus>,
    pub comparisons: Vec<ComparisonGroup>,
    /// Interleaved per-store preview of ranked offers
    pub offers: Vec<RankedOffer>,
}

/// Why a store fetch failed. Failures never abort a search; they degrade
/// into a `StoreStatus` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Missing RAPIDAPI key for {0}")]
    MissingCredential(Store),
    #[error("Request timed out")]
    Timeout,
    #[error("{0}")]
    Network(String),
    /// Message extracted from an upstream error payload
    #[error("{0}")]
    Upstream(String),
}

/// Result of one store fetch: collected offers plus an error when the
/// store degraded. A failed page can still leave partial offers.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub store: Store,
    pub offers: Vec<Offer>,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    pub fn success(store: Store, offers: Vec<Offer>) -> Self {
        Self { store, offers, error: None }
    }

    pub fn failure(store: Store, error: FetchError, partial: Vec<Offer>) -> Self {
        Self { store, offers: partial, error: Some(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Lowers this outcome to the response annotation.
    pub fn status(&self) -> StoreStatus {
        StoreStatus { ok: self.is_ok(), error: self.error.as_ref().map(ToString::to_string) }
    }
}
