// =============================================================================
// API CLIENT MODULE
// =============================================================================
// This module talks to the remote product catalog (a JSON REST API).
//
// LEARNING NOTES:
// - reqwest is an async HTTP client built on Tokio
// - The CatalogApi trait is the seam between the catalog controller and the
//   network, so tests can swap in an in-memory fake
// - Non-2xx responses are translated into ShopError::Api
// =============================================================================

use std::time::{Duration, Instant};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ShopError, ShopResult};
use crate::metrics;
use crate::models::{ApiErrorBody, CategoryEntry, QueryParams};

// =============================================================================
// CATALOG API TRAIT
// =============================================================================
/// What the catalog controller needs from the API.
///
/// LEARNING NOTE:
/// `async fn` in traits is stable since Rust 1.75. The futures are not
/// required to be Send here because the storefront drives everything from a
/// single task.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// GET the path made of `path` segments and decode the JSON body as `T`
    ///
    /// Each segment is sent as one path segment, even if it contains a '/'.
    async fn get_json<T: DeserializeOwned>(&self, path: &[&str], params: &QueryParams)
        -> ShopResult<T>;

    /// Fetch all category names, sorted case-insensitively
    async fn get_categories(&self) -> ShopResult<Vec<String>> {
        let entries: Vec<CategoryEntry> = self
            .get_json(&["products", "categories"], &QueryParams::new())
            .await?;

        let mut categories: Vec<String> =
            entries.into_iter().map(CategoryEntry::into_slug).collect();
        categories.sort_by_key(|c| c.to_lowercase());
        Ok(categories)
    }
}

// =============================================================================
// REST API CLIENT
// =============================================================================
/// JSON REST client bound to one base URL.
///
/// Every request goes to `{base_url}/{segments}{url_suffix}` (the suffix exists
/// for APIs such as Firebase that want ".json" on every path).
#[derive(Debug, Clone)]
pub struct RestApi {
    client: reqwest::Client,
    base_url: Url,
    url_suffix: String,
}

impl RestApi {
    /// Create a client for `base_url`
    ///
    /// # Arguments
    /// * `base_url` - e.g. "https://dummyjson.com"
    /// * `url_suffix` - appended to every path, usually empty
    /// * `timeout` - per-request timeout
    pub fn new(base_url: &str, url_suffix: &str, timeout: Duration) -> ShopResult<Self> {
        let base_url = Url::parse(base_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            url_suffix: url_suffix.to_string(),
        })
    }

    // -------------------------------------------------------------------------
    // WRITE REQUESTS
    // -------------------------------------------------------------------------

    /// POST a JSON body
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &[&str],
        body: &B,
        params: &QueryParams,
    ) -> ShopResult<T> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Some(&body), params).await
    }

    /// PATCH a JSON body
    pub async fn patch_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &[&str],
        body: &B,
        params: &QueryParams,
    ) -> ShopResult<T> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PATCH, path, Some(&body), params).await
    }

    /// DELETE with a JSON body
    pub async fn delete_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &[&str],
        body: &B,
        params: &QueryParams,
    ) -> ShopResult<T> {
        let body = serde_json::to_value(body)?;
        self.send(Method::DELETE, path, Some(&body), params).await
    }

    // -------------------------------------------------------------------------
    // URL BUILDING
    // -------------------------------------------------------------------------
    /// Assemble the request URL.
    ///
    /// Path segments are percent-encoded individually (a '/' inside a
    /// segment becomes %2F); parameters with several values are repeated
    /// (`?id=1&id=2`).
    pub fn build_request_url(&self, path: &[&str], params: &QueryParams) -> ShopResult<Url> {
        let mut url = self.base_url.clone();

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty();

            let last = path.len().saturating_sub(1);
            for (idx, segment) in path.iter().enumerate() {
                if idx == last {
                    segments.push(&format!("{}{}", segment, self.url_suffix));
                } else {
                    segments.push(segment);
                }
            }
        }

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.pairs());
        }

        Ok(url)
    }

    // -------------------------------------------------------------------------
    // REQUEST EXECUTION
    // -------------------------------------------------------------------------
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&serde_json::Value>,
        params: &QueryParams,
    ) -> ShopResult<T> {
        let url = self.build_request_url(path, params)?;
        let endpoint = endpoint_label(path);
        let start = Instant::now();

        debug!(method = %method, url = %url, "Sending API request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            // .json() also sets Content-Type: application/json
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                metrics::record_api_request(
                    method.as_str(),
                    &endpoint,
                    0,
                    start.elapsed().as_secs_f64(),
                );
                warn!(method = %method, endpoint = %endpoint, error = %err, "API request failed");
                return Err(err.into());
            }
        };

        let status = response.status();
        let bytes = response.bytes().await?;

        metrics::record_api_request(
            method.as_str(),
            &endpoint,
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            // The error body is optional and may not even be JSON
            let error_body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let err = ShopError::from_status(status.as_u16(), error_body.text());

            warn!(
                method = %method,
                endpoint = %endpoint,
                status = status.as_u16(),
                error = %err,
                "API returned an error status"
            );
            return Err(err);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl CatalogApi for RestApi {
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &[&str],
        params: &QueryParams,
    ) -> ShopResult<T> {
        self.send(Method::GET, path, None, params).await
    }
}

/// Metric label for a request path.
///
/// Only the first two segments are kept so category names and ids do not
/// end up as label values.
fn endpoint_label(path: &[&str]) -> String {
    path.iter().take(2).copied().collect::<Vec<_>>().join("/")
}
