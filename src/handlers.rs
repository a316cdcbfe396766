// =============================================================================
// HANDLERS MODULE
// =============================================================================
// HTTP handlers for the optional observability endpoints. The storefront
// itself runs in the terminal; these only exist so Prometheus can scrape
// the session while it is running (enabled with METRICS_PORT).
//
// LEARNING NOTES:
// - Handlers are async functions that return something Axum can turn into
//   a response (Json<T>, String, ...)
// - State is shared via the State<T> extractor
// =============================================================================

use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::models::HealthResponse;

/// Build the router for /health and /metrics
pub fn router(metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle)
}

/// Liveness check - Is the storefront running?
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prometheus metrics endpoint
///
/// GET /metrics
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_package() {
        let Json(health) = health_check().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.service, "storefront");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
