// =============================================================================
// CONFIGURATION MODULE
// =============================================================================
// This module handles loading configuration from environment variables.
//
// LEARNING NOTES:
// - Environment variables (or a .env file) configure the storefront
// - We parse them into a strongly-typed Config struct
// - This makes configuration errors obvious at startup, not runtime
// =============================================================================

use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

/// Catalog API used when SHOP_API_URL is not set
pub const DEFAULT_API_URL: &str = "https://dummyjson.com";

// -----------------------------------------------------------------------------
// CONFIG STRUCT
// -----------------------------------------------------------------------------
// This struct holds all configuration values for the storefront.
// Each field corresponds to an environment variable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalog API (SHOP_API_URL)
    pub api_url: String,

    /// Appended to every request path, e.g. ".json" (SHOP_API_URL_SUFFIX)
    pub api_url_suffix: String,

    /// Products per result page (SHOP_PAGE_SIZE, default: 20)
    pub page_size: u32,

    /// Per-request timeout (SHOP_API_TIMEOUT_SECS, default: 10)
    pub api_timeout: Duration,

    /// Stock below this is flagged on product cards (LOW_STOCK_THRESHOLD)
    pub low_stock_threshold: i64,

    /// Port for /health and /metrics; disabled when unset (METRICS_PORT)
    pub metrics_port: Option<u16>,
}

impl Config {
    // -------------------------------------------------------------------------
    // LOAD CONFIGURATION FROM ENVIRONMENT
    // -------------------------------------------------------------------------
    /// Creates a Config by reading environment variables.
    ///
    /// # Returns
    /// - `Ok(Config)` if all variables that are set parse correctly
    /// - `Err` if a value is malformed or SHOP_PAGE_SIZE is zero
    pub fn from_env() -> Result<Self> {
        let page_size: u32 = env::var("SHOP_PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .context("Failed to parse SHOP_PAGE_SIZE as a number")?;
        if page_size == 0 {
            bail!("SHOP_PAGE_SIZE must be greater than zero");
        }

        let timeout_secs: u64 = env::var("SHOP_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Failed to parse SHOP_API_TIMEOUT_SECS as a number")?;

        // Optional: only parse when present
        let metrics_port = match env::var("METRICS_PORT") {
            Ok(port) => Some(
                port.parse()
                    .context("Failed to parse METRICS_PORT as a number")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            api_url: env::var("SHOP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_url_suffix: env::var("SHOP_API_URL_SUFFIX").unwrap_or_default(),
            page_size,
            api_timeout: Duration::from_secs(timeout_secs),
            low_stock_threshold: env::var("LOW_STOCK_THRESHOLD")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Failed to parse LOW_STOCK_THRESHOLD as a number")?,
            metrics_port,
        })
    }
}
