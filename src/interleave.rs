//! Store-fair presentation order for the flat offer list.
//!
//! Sorting purely by relevance or price would let one store dominate the
//! top of the list, so offers are dealt out round-robin: each store's
//! cheapest offer first, then each store's second-cheapest, and so on.

use crate::model::{RankedOffer, Store};
use std::collections::BTreeMap;

/// Interleaves offers store by store, cheapest first within each store,
/// stopping at `max_count`.
pub fn build_visible_offers(offers: &[RankedOffer], max_count: usize) -> Vec<RankedOffer> {
    let mut buckets: BTreeMap<Store, Vec<RankedOffer>> = BTreeMap::new();
    for offer in offers {
        buckets.entry(offer.offer.store).or_default().push(offer.clone());
    }

    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| a.offer.sort_price().total_cmp(&b.offer.sort_price()));
    }

    let mut out = Vec::new();
    let mut round = 0;
    let mut progressed = true;

    while out.len() < max_count && progressed {
        progressed = false;
        for bucket in buckets.values() {
            if let Some(offer) = bucket.get(round) {
                out.push(offer.clone());
                progressed = true;
                if out.len() >= max_count {
                    break;
                }
            }
        }
        round += 1;
    }

    out
}
