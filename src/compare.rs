//! Cross-store comparison: grouping equivalent products and computing
//! the savings between the cheapest and dearest offer.
//!
//! Offers are grouped by a fuzzy match key built from their name and
//! brand with store names and filler words stripped. Within a group,
//! offers sort by price per kg/litre when both sides carry a parsable
//! quantity of the same unit class, falling back to absolute price.

use crate::model::{ComparisonGroup, Offer, RankedOffer};
use crate::text::normalize;
use std::cmp::Ordering;
use tracing::debug;

mod patterns {
    use regex_lite::Regex;
    use std::sync::LazyLock;

    /// Store names and filler words that differ between listings of the
    /// same product.
    pub static STOP_WORDS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(coles|woolworths|aldi|brand|original|classic|value|pack|pk|each|ea)\b")
            .unwrap()
    });

    pub static UNIT_KG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(kg|\d+\s*g\b|\bg\b)").unwrap());

    pub static UNIT_L: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(ml|\d+\s*l\b|\bl\b)").unwrap());

    /// A quantity with its unit, e.g. "500g" or "1.25 l".
    pub static QUANTITY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(kg|g|l|ml)\b").unwrap());
}

/// Weight or volume class of a size text, when it names one.
pub fn unit_class(size_text: &str) -> Option<&'static str> {
    if patterns::UNIT_KG.is_match(size_text) {
        Some("kg")
    } else if patterns::UNIT_L.is_match(size_text) {
        Some("l")
    } else {
        None
    }
}

/// Size quantity scaled to base units (kg or litres).
fn unit_quantity(size_text: &str) -> Option<f64> {
    let caps = patterns::QUANTITY.captures(size_text)?;
    let amount: f64 = caps[1].parse().ok()?;

    let scaled = match &caps[2] {
        "g" | "ml" => amount / 1000.0,
        _ => amount,
    };

    (scaled > 0.0).then_some(scaled)
}

/// Price per kg or per litre, for offers whose size text carries a
/// parsable quantity.
pub fn unit_price(offer: &Offer) -> Option<f64> {
    let price = offer.current_price?;
    let size = offer.product_size.as_deref()?.to_lowercase();
    Some(price / unit_quantity(&size)?)
}

/// Fuzzy identity key for matching the same product across stores.
pub fn offer_match_key(offer: &Offer) -> String {
    let text = normalize(&format!("{} {}", offer.product_name, offer.product_brand));
    let stripped = patterns::STOP_WORDS.replace_all(&text, " ");

    let mut tokens: Vec<&str> = stripped
        .split_whitespace()
        .filter(|token| token.len() > 1 && !token.chars().all(|c| c.is_ascii_digit()))
        .collect();
    tokens.sort_unstable();
    tokens.truncate(6);

    let size_text = normalize(offer.product_size.as_deref().unwrap_or(""));
    let unit = unit_class(&size_text).unwrap_or("na");

    format!("{}|{}", tokens.join("_"), unit)
}

/// Orders two offers by unit price when both sides are in the same unit
/// class, otherwise by absolute price with missing prices last.
fn compare_by_unit_or_price(a: &RankedOffer, b: &RankedOffer) -> Ordering {
    let a_class = unit_class(&size_lower(&a.offer));
    let b_class = unit_class(&size_lower(&b.offer));

    if a_class.is_some() && a_class == b_class {
        if let (Some(ua), Some(ub)) = (unit_price(&a.offer), unit_price(&b.offer)) {
            return ua.total_cmp(&ub);
        }
    }

    a.offer.sort_price().total_cmp(&b.offer.sort_price())
}

fn size_lower(offer: &Offer) -> String {
    offer.product_size.as_deref().unwrap_or("").to_lowercase()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

struct GroupDraft {
    key: String,
    product_name: String,
    product_brand: String,
    product_size: Option<String>,
    members: Vec<RankedOffer>,
}

/// Groups ranked offers into cross-store comparisons, best value first
/// within each group, and sorts groups by the savings they unlock.
pub fn build_comparison(offers: &[RankedOffer], limit: usize) -> Vec<ComparisonGroup> {
    let mut drafts: Vec<GroupDraft> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for offer in offers {
        let key = offer_match_key(&offer.offer);
        match index.get(&key) {
            Some(&slot) => drafts[slot].members.push(offer.clone()),
            None => {
                index.insert(key.clone(), drafts.len());
                // group identity comes from the first offer seen
                drafts.push(GroupDraft {
                    key,
                    product_name: offer.offer.product_name.clone(),
                    product_brand: offer.offer.product_brand.clone(),
                    product_size: offer.offer.product_size.clone(),
                    members: vec![offer.clone()],
                });
            }
        }
    }

    debug!("Grouped {} offers into {} comparisons", offers.len(), drafts.len());

    let mut compared: Vec<ComparisonGroup> = drafts
        .into_iter()
        .map(|draft| {
            let mut members = draft.members;
            members.sort_by(compare_by_unit_or_price);

            let best_offer =
                members.iter().find(|m| m.offer.current_price.is_some()).cloned();

            // Savings span the absolute prices, so a unit-price winner
            // with a higher shelf price never yields a negative figure.
            let prices = members.iter().filter_map(|m| m.offer.current_price);
            let min = prices.clone().min_by(f64::total_cmp);
            let max = prices.max_by(f64::total_cmp);
            let savings = match (min, max) {
                (Some(min), Some(max)) => Some(round2(max - min)),
                _ => None,
            };

            ComparisonGroup {
                key: draft.key,
                product_name: draft.product_name,
                product_brand: draft.product_brand,
                product_size: draft.product_size,
                offers: members,
                best_offer,
                savings,
            }
        })
        .collect();

    compared.sort_by(|a, b| {
        let sa = a.savings.unwrap_or(-1.0);
        let sb = b.savings.unwrap_or(-1.0);
        sb.total_cmp(&sa).then_with(|| {
            let pa = a.best_offer.as_ref().map_or(f64::INFINITY, |o| o.offer.sort_price());
            let pb = b.best_offer.as_ref().map_or(f64::INFINITY, |o| o.offer.sort_price());
            pa.total_cmp(&pb)
        })
    });

    compared.truncate(limit);
    compared
}
