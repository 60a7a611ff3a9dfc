//! HTTP API surface: the combined comparison search, the ALDI AU
//! passthrough, and a health check.

use crate::category::Category;
use crate::config::Config;
use crate::model::Store;
use crate::pipeline::{filter_by_category, run_search};
use crate::stores::aldi::sanitize_aldi_limit;
use crate::stores::client::extract_error_message;
use crate::stores::extract::{normalize_offer, search_results};
use crate::stores::{AldiFetcher, RapidApiFetcher, StoreFetch, StoreProfile};
use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

/// Shared server state: one fetcher per store plus the raw ALDI client
/// for the passthrough endpoint.
#[derive(Clone)]
pub struct AppState {
    pub fetchers: Vec<Arc<dyn StoreFetch>>,
    pub aldi: Arc<AldiFetcher>,
    pub default_limit: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let aldi = Arc::new(AldiFetcher::new(config)?);
        let fetchers: Vec<Arc<dyn StoreFetch>> = vec![
            Arc::new(RapidApiFetcher::new(config, StoreProfile::coles())?),
            Arc::new(RapidApiFetcher::new(config, StoreProfile::woolworths())?),
            aldi.clone(),
        ];

        Ok(Self { fetchers, aldi, default_limit: config.default_limit })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/compare/search", get(compare_search))
        .route("/api/aldi/search", get(aldi_search))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Query parameters arrive as raw strings so malformed numbers fall back
/// to defaults instead of rejecting the request.
#[derive(Debug, Deserialize)]
struct CompareParams {
    q: Option<String>,
    limit: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AldiParams {
    q: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
    category: Option<String>,
}

fn parse_number(input: Option<&str>, fallback: f64) -> f64 {
    input
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|number| number.is_finite())
        .unwrap_or(fallback)
}

fn missing_query() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing query parameter: q" })))
        .into_response()
}

async fn compare_search(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Response {
    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return missing_query();
    }

    let limit =
        parse_number(params.limit.as_deref(), state.default_limit as f64).clamp(1.0, 60.0) as usize;
    let category = Category::sanitize(params.category.as_deref().unwrap_or(""));

    match run_search(&state.fetchers, query, limit, category).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!("Comparison search for '{}' failed: {:#}", query, err);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Unable to fetch product comparison",
                    "details": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn aldi_search(
    State(state): State<AppState>,
    Query(params): Query<AldiParams>,
) -> Response {
    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return missing_query();
    }

    let limit = sanitize_aldi_limit(parse_number(params.limit.as_deref(), 12.0));
    let offset = parse_number(params.offset.as_deref(), 0.0).max(0.0) as u32;
    let category = Category::sanitize(params.category.as_deref().unwrap_or(""));

    let upstream = match state.aldi.search_page(query, f64::from(limit), offset).await {
        Ok(response) => response,
        Err(err) => {
            let message = err.to_string();
            warn!("ALDI search for '{}' failed: {}", query, message);
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": message, "upstream": { "error": message } })),
            )
                .into_response();
        }
    };

    if !upstream.ok {
        let message = extract_error_message(&upstream.data, "ALDI AU search failed");
        warn!("ALDI search for '{}' returned {}: {}", query, upstream.status, message);
        let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return (status, Json(json!({ "error": message, "upstream": upstream.data })))
            .into_response();
    }

    let all_results: Vec<_> = search_results(&upstream.data)
        .iter()
        .map(|item| normalize_offer(item, Store::Aldi))
        .collect();
    let total = upstream
        .data
        .get("total")
        .and_then(parse_total)
        .unwrap_or(all_results.len() as u64);
    let results = filter_by_category(all_results, category);

    Json(json!({
        "query": query,
        "category": category,
        "limit": limit,
        "offset": offset,
        "count": results.len(),
        "total": total,
        "results": results,
        "source": Store::Aldi.source_tag(),
    }))
    .into_response()
}

fn parse_total(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_str().and_then(|raw| raw.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FetchError, FetchOutcome, Offer};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

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

    fn offer(store: Store, name: &str, price: Option<f64>) -> Offer {
        Offer {
            store,
            product_name: name.to_string(),
            product_brand: "Unknown".to_string(),
            product_size: Some("2L".to_string()),
            current_price: price,
            currency: Some("AUD".to_string()),
            url: None,
            source: store.source_tag().to_string(),
            category: Category::classify(name),
        }
    }

    fn state_with(fetchers: Vec<Arc<dyn StoreFetch>>, aldi_base: &str) -> AppState {
        let aldi = Arc::new(
            AldiFetcher::with_base_url(&Config::new(), Some(aldi_base.to_string())).unwrap(),
        );
        AppState { fetchers, aldi, default_limit: 15 }
    }

    async fn get_response(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("12"), 15.0), 12.0);
        assert_eq!(parse_number(Some(" 2.5 "), 15.0), 2.5);
        assert_eq!(parse_number(Some("abc"), 15.0), 15.0);
        assert_eq!(parse_number(Some(""), 15.0), 15.0);
        assert_eq!(parse_number(Some("inf"), 15.0), 15.0);
        assert_eq!(parse_number(None, 15.0), 15.0);
        assert_eq!(parse_number(Some("-5"), 0.0), -5.0);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_response(state_with(Vec::new(), "http://127.0.0.1:1"), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_compare_search_requires_query() {
        let state = state_with(Vec::new(), "http://127.0.0.1:1");
        let (status, body) = get_response(state.clone(), "/api/compare/search").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing query parameter: q");

        let (status, _) = get_response(state, "/api/compare/search?q=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compare_search_reports_stores_and_groups() {
        let fetchers: Vec<Arc<dyn StoreFetch>> = vec![
            Arc::new(MockFetcher {
                store: Store::Coles,
                outcome: FetchOutcome::success(
                    Store::Coles,
                    vec![offer(Store::Coles, "Full Cream Milk", Some(3.5))],
                ),
            }),
            Arc::new(MockFetcher {
                store: Store::Woolworths,
                outcome: FetchOutcome::failure(
                    Store::Woolworths,
                    FetchError::Timeout,
                    Vec::new(),
                ),
            }),
        ];

        let state = state_with(fetchers, "http://127.0.0.1:1");
        let (status, body) = get_response(state, "/api/compare/search?q=milk").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "milk");
        assert_eq!(body["category"], "all");
        assert_eq!(body["count"], 1);
        assert_eq!(body["offers_count"], 1);
        assert_eq!(body["raw_offers_count"], 1);
        assert_eq!(body["stores"]["Coles"]["ok"], true);
        assert_eq!(body["stores"]["Coles"]["error"], Value::Null);
        assert_eq!(body["stores"]["Woolworths"]["ok"], false);
        assert_eq!(body["stores"]["Woolworths"]["error"], "Request timed out");
        assert_eq!(body["comparisons"][0]["best_offer"]["store"], "Coles");
        assert_eq!(body["offers"][0]["product_name"], "Full Cream Milk");
    }

    #[tokio::test]
    async fn test_compare_search_limit_truncates_groups() {
        let fetchers: Vec<Arc<dyn StoreFetch>> = vec![Arc::new(MockFetcher {
            store: Store::Coles,
            outcome: FetchOutcome::success(
                Store::Coles,
                vec![
                    offer(Store::Coles, "Full Cream Milk", Some(3.5)),
                    offer(Store::Coles, "Skim Milk", Some(2.9)),
                ],
            ),
        })];

        let state = state_with(fetchers, "http://127.0.0.1:1");
        let (status, body) = get_response(state, "/api/compare/search?q=milk&limit=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["offers_count"], 2);
    }

    #[tokio::test]
    async fn test_aldi_search_requires_query() {
        let (status, body) =
            get_response(state_with(Vec::new(), "http://127.0.0.1:1"), "/api/aldi/search").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing query parameter: q");
    }

    #[tokio::test]
    async fn test_aldi_search_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/product-search"))
            .and(query_param("q", "milk"))
            .and(query_param("limit", "16"))
            .and(query_param("offset", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "name": "Full Cream Milk", "brandName": "Farmdale", "price": { "amount": 315 } },
                    { "name": "Corn Chips", "brandName": "Blackstone", "price": { "amount": 250 } }
                ],
                "total": 120
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = state_with(Vec::new(), &server.uri());
        let (status, body) =
            get_response(state, "/api/aldi/search?q=milk&limit=15&offset=4&category=dairy").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "milk");
        assert_eq!(body["category"], "dairy");
        assert_eq!(body["limit"], 16);
        assert_eq!(body["offset"], 4);
        assert_eq!(body["count"], 1);
        assert_eq!(body["total"], 120);
        assert_eq!(body["source"], "aldi-au-public-api");
        assert_eq!(body["results"][0]["product_name"], "Full Cream Milk");
        assert_eq!(body["results"][0]["store"], "Aldi");
    }

    #[tokio::test]
    async fn test_aldi_search_echoes_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/product-search"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "message": "ALDI down" })),
            )
            .mount(&server)
            .await;

        let state = state_with(Vec::new(), &server.uri());
        let (status, body) = get_response(state, "/api/aldi/search?q=milk").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "ALDI down");
        assert_eq!(body["upstream"]["message"], "ALDI down");
    }

    #[tokio::test]
    async fn test_aldi_search_unreachable_upstream() {
        let state = state_with(Vec::new(), "http://127.0.0.1:1");
        let (status, body) = get_response(state, "/api/aldi/search?q=milk").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = body["error"].as_str().unwrap();
        assert!(!message.is_empty());
        assert_eq!(body["upstream"]["error"], body["error"]);
    }
}
