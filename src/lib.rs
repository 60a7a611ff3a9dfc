//! grocer-compare - Grocery price comparison across Australian stores
//!
//! Fetches product offers from Coles, Woolworths, and ALDI AU in
//! parallel, ranks them against the search query, and groups matching
//! products into cross-store price comparisons.

pub mod category;
pub mod commands;
pub mod compare;
pub mod config;
pub mod format;
pub mod interleave;
pub mod model;
pub mod pipeline;
pub mod rank;
pub mod server;
pub mod stores;
pub mod text;

pub use category::Category;
pub use config::Config;
pub use model::{ComparisonGroup, Offer, RankedOffer, SearchReport, Store};
