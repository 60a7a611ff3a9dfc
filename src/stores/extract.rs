//! Normalizes the wildly different upstream product payloads into [`Offer`]s.
//!
//! Each store names its fields differently (and some nest the price), so
//! extraction walks an ordered candidate list per field and takes the first
//! usable value.

use crate::category::Category;
use crate::model::{Offer, Store};
use crate::text::parse_price_value;
use serde_json::Value;

const PRICE_FIELDS: &[&str] = &[
    "current_price",
    "new_price",
    "price",
    "sale_price",
    "unit_price",
    "price.amountRelevantDisplay",
    "price.amount",
];

const NAME_FIELDS: &[&str] = &["product_name", "name", "title"];
const BRAND_FIELDS: &[&str] = &["product_brand", "brand", "brandName"];
const SIZE_FIELDS: &[&str] = &["product_size", "size", "unit", "sellingSize"];
const URL_FIELDS: &[&str] = &["url", "product_url"];
const SLUG_FIELDS: &[&str] = &["urlSlugText", "url_slug", "slug"];

const ALDI_PRODUCT_BASE: &str = "https://www.aldi.com.au/product";

/// Follows a dot-separated path into a JSON object.
fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(item, |value, key| value.get(key))
}

fn first_text(item: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        lookup(item, field).and_then(value_text).filter(|text| !text.is_empty())
    })
}

/// String content of a JSON value, with numbers rendered as text. ALDI
/// serves numeric SKUs where the other stores use strings.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_price(item: &Value) -> Option<f64> {
    PRICE_FIELDS
        .iter()
        .find_map(|field| lookup(item, field).and_then(parse_price_value))
        .filter(|price| *price >= 0.0)
}

/// Builds a retail product URL from the slug and SKU fields ALDI items
/// carry instead of a link. Runs as the final url fallback for every
/// store; only ALDI payloads carry slugs in practice.
fn aldi_product_url(item: &Value) -> Option<String> {
    let slug = first_text(item, SLUG_FIELDS)
        .map(|s| s.trim_start_matches('/').to_string())
        .filter(|s| !s.is_empty())?;

    let sku = item
        .get("sku")
        .and_then(value_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Some(match sku {
        Some(sku) => format!("{}/{}-{}", ALDI_PRODUCT_BASE, slug, sku),
        None => format!("{}/{}", ALDI_PRODUCT_BASE, slug),
    })
}

/// Lowers one raw product item into a normalized [`Offer`].
pub fn normalize_offer(item: &Value, store: Store) -> Offer {
    let product_name = first_text(item, NAME_FIELDS).unwrap_or_else(|| "Unknown".to_string());
    let product_brand = first_text(item, BRAND_FIELDS).unwrap_or_else(|| "Unknown".to_string());
    let product_size = first_text(item, SIZE_FIELDS);
    let current_price = first_price(item);

    let currency = first_text(item, &["currency", "price.currencyCode"]).or_else(|| {
        (store == Store::Aldi).then(|| "AUD".to_string())
    });

    let url = first_text(item, URL_FIELDS).or_else(|| aldi_product_url(item));

    let category = Category::classify(&format!(
        "{} {} {}",
        product_name,
        product_brand,
        product_size.as_deref().unwrap_or("")
    ));

    Offer {
        store,
        product_name,
        product_brand,
        product_size,
        current_price,
        currency,
        url,
        source: store.source_tag().to_string(),
        category,
    }
}

/// Finds the product list in a search payload, whichever key it hides under.
pub fn search_results(data: &Value) -> &[Value] {
    for key in ["results", "data", "items"] {
        if let Some(list) = data.get(key).and_then(Value::as_array) {
            return list;
        }
    }

    &[]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_coles_item() {
        let item = json!({
            "product_name": "Full Cream Milk",
            "product_brand": "Coles",
            "product_size": "2L",
            "current_price": 3.1,
            "url": "https://www.coles.com.au/product/123"
        });

        let offer = normalize_offer(&item, Store::Coles);

        assert_eq!(offer.product_name, "Full Cream Milk");
        assert_eq!(offer.product_brand, "Coles");
        assert_eq!(offer.product_size.as_deref(), Some("2L"));
        assert_eq!(offer.current_price, Some(3.1));
        assert_eq!(offer.url.as_deref(), Some("https://www.coles.com.au/product/123"));
        assert_eq!(offer.source, "coles-rapidapi");
        assert_eq!(offer.category, Category::Dairy);
        assert_eq!(offer.currency, None);
    }

    #[test]
    fn test_price_field_priority() {
        let item = json!({"current_price": 4.0, "price": 9.0});
        assert_eq!(normalize_offer(&item, Store::Coles).current_price, Some(4.0));

        let item = json!({"sale_price": "$2.50", "name": "x"});
        assert_eq!(normalize_offer(&item, Store::Coles).current_price, Some(2.5));
    }

    #[test]
    fn test_nested_aldi_price() {
        let item = json!({
            "name": "Farmdale Milk",
            "price": {"amountRelevantDisplay": "$1.55", "currencyCode": "AUD"}
        });

        let offer = normalize_offer(&item, Store::Aldi);

        assert_eq!(offer.current_price, Some(1.55));
        assert_eq!(offer.currency.as_deref(), Some("AUD"));
    }

    #[test]
    fn test_unparseable_price_is_none() {
        let item = json!({"current_price": "call us", "name": "Mystery Item"});
        assert_eq!(normalize_offer(&item, Store::Woolworths).current_price, None);
    }

    #[test]
    fn test_negative_price_is_discarded() {
        let item = json!({"current_price": -2.0, "name": "Refund"});
        assert_eq!(normalize_offer(&item, Store::Coles).current_price, None);
    }

    #[test]
    fn test_name_and_brand_fallbacks() {
        let item = json!({"title": "Choc Biscuits", "brandName": "Arnotts"});
        let offer = normalize_offer(&item, Store::Woolworths);

        assert_eq!(offer.product_name, "Choc Biscuits");
        assert_eq!(offer.product_brand, "Arnotts");

        let offer = normalize_offer(&json!({}), Store::Coles);
        assert_eq!(offer.product_name, "Unknown");
        assert_eq!(offer.product_brand, "Unknown");
        assert_eq!(offer.product_size, None);
    }

    #[test]
    fn test_empty_name_falls_through() {
        let item = json!({"product_name": "", "name": "Backup Name"});
        assert_eq!(normalize_offer(&item, Store::Coles).product_name, "Backup Name");
    }

    #[test]
    fn test_aldi_defaults_currency() {
        let offer = normalize_offer(&json!({"name": "Bread"}), Store::Aldi);
        assert_eq!(offer.currency.as_deref(), Some("AUD"));

        let offer = normalize_offer(&json!({"name": "Bread"}), Store::Coles);
        assert_eq!(offer.currency, None);
    }

    #[test]
    fn test_aldi_url_from_slug_and_sku() {
        let item = json!({"name": "Milk", "urlSlugText": "/farmdale-milk", "sku": 410062});
        let offer = normalize_offer(&item, Store::Aldi);

        assert_eq!(
            offer.url.as_deref(),
            Some("https://www.aldi.com.au/product/farmdale-milk-410062")
        );
    }

    #[test]
    fn test_aldi_url_slug_only() {
        let item = json!({"name": "Milk", "url_slug": "farmdale-milk"});
        let offer = normalize_offer(&item, Store::Aldi);

        assert_eq!(offer.url.as_deref(), Some("https://www.aldi.com.au/product/farmdale-milk"));
    }

    #[test]
    fn test_aldi_url_missing_slug() {
        let offer = normalize_offer(&json!({"name": "Milk", "sku": "410062"}), Store::Aldi);
        assert_eq!(offer.url, None);
    }

    #[test]
    fn test_slug_url_fallback_for_any_store() {
        let item = json!({"name": "Choc Biscuits", "slug": "choc-biscuits", "sku": "9001"});
        let offer = normalize_offer(&item, Store::Coles);

        assert_eq!(
            offer.url.as_deref(),
            Some("https://www.aldi.com.au/product/choc-biscuits-9001")
        );
    }

    #[test]
    fn test_direct_url_wins_over_synthesis() {
        let item = json!({
            "name": "Milk",
            "product_url": "https://example.com/p/1",
            "slug": "milk"
        });
        let offer = normalize_offer(&item, Store::Aldi);

        assert_eq!(offer.url.as_deref(), Some("https://example.com/p/1"));
    }

    #[test]
    fn test_category_derived_from_text() {
        let item = json!({"name": "Laundry Detergent", "size": "1L"});
        assert_eq!(normalize_offer(&item, Store::Coles).category, Category::Household);
    }

    #[test]
    fn test_search_results_key_order() {
        let results = json!({"results": [1], "data": [2, 3]});
        assert_eq!(search_results(&results).len(), 1);

        let data = json!({"data": [1, 2]});
        assert_eq!(search_results(&data).len(), 2);

        let items = json!({"items": [1, 2, 3]});
        assert_eq!(search_results(&items).len(), 3);

        assert!(search_results(&json!({"results": "not a list"})).is_empty());
        assert!(search_results(&json!({})).is_empty());
        assert!(search_results(&json!(null)).is_empty());
    }

    #[test]
    fn test_search_results_skips_non_array() {
        // a non-array value under one key should not mask a list under the next
        let payload = json!({"results": {"nested": true}, "items": [1]});
        assert_eq!(search_results(&payload).len(), 1);
    }
}
