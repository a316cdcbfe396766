// =============================================================================
// METRICS MODULE
// =============================================================================
// This module sets up Prometheus metrics for observability.
//
// LEARNING NOTES:
// - Prometheus uses a "pull" model - it scrapes the /metrics endpoint
// - Metrics have types: Counter, Gauge, Histogram
// - Labels add dimensions to metrics (e.g., endpoint="products/search")
// - When no recorder is installed (tests), the macros are no-ops
// =============================================================================

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// METRIC NAMES (Constants)
// =============================================================================

/// Catalog API request counter
/// Labels: method, endpoint, status
pub const API_REQUESTS_TOTAL: &str = "shop_api_requests_total";

/// Catalog API request duration histogram
/// Labels: method, endpoint
pub const API_REQUEST_DURATION_SECONDS: &str = "shop_api_request_duration_seconds";

/// Result pages shown to the user
/// Labels: mode (all/name/category)
pub const CATALOG_PAGE_VIEWS_TOTAL: &str = "shop_catalog_page_views_total";

/// Distinct lines currently in the cart
pub const CART_LINES: &str = "shop_cart_lines";

/// Current cart value in dollars
pub const CART_VALUE: &str = "shop_cart_value";

/// Checkouts recorded
pub const PURCHASE_INTENTS_TOTAL: &str = "shop_purchase_intents_total";

// =============================================================================
// SETUP FUNCTION
// =============================================================================
/// Initialize the Prometheus metrics recorder
///
/// Installs the recorder globally and returns a handle for rendering.
pub fn setup_metrics() -> Result<PrometheusHandle> {
    // Remote API calls: fast responses are tens of milliseconds, anything
    // past a few seconds is close to the request timeout.
    let latency_buckets = &[
        0.01,  // 10ms
        0.025, // 25ms
        0.05,  // 50ms
        0.1,   // 100ms
        0.25,  // 250ms
        0.5,   // 500ms
        1.0,   // 1 second
        2.5,   // 2.5 seconds
        5.0,   // 5 seconds
        10.0,  // 10 seconds
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(API_REQUEST_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    describe_counter!(API_REQUESTS_TOTAL, "Total number of catalog API requests");
    describe_histogram!(
        API_REQUEST_DURATION_SECONDS,
        "Catalog API request latency in seconds"
    );
    describe_counter!(
        CATALOG_PAGE_VIEWS_TOTAL,
        "Number of product result pages displayed"
    );
    describe_gauge!(CART_LINES, "Distinct products currently in the cart");
    describe_gauge!(CART_VALUE, "Total price of the cart in dollars");
    describe_counter!(PURCHASE_INTENTS_TOTAL, "Number of recorded checkouts");

    Ok(handle)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Record a catalog API request
///
/// # Arguments
/// * `method` - HTTP method (GET, POST, etc.)
/// * `endpoint` - Request path (products/search)
/// * `status` - Response status code, 0 when no response arrived
/// * `duration_secs` - Request duration in seconds
pub fn record_api_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    counter!(
        API_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        API_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(duration_secs);
}

/// Record that a result page was rendered
pub fn record_page_view(mode: &'static str) {
    counter!(CATALOG_PAGE_VIEWS_TOTAL, "mode" => mode).increment(1);
}

/// Update the cart gauges
pub fn set_cart_state(lines: usize, value: f64) {
    gauge!(CART_LINES).set(lines as f64);
    gauge!(CART_VALUE).set(value);
}

/// Record a checkout
pub fn record_purchase_intent() {
    counter!(PURCHASE_INTENTS_TOTAL).increment(1);
}
