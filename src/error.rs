// =============================================================================
// ERROR MODULE
// =============================================================================
// This module defines the storefront's error type.
//
// LEARNING NOTES:
// - Rust doesn't have exceptions; it uses Result<T, E> for error handling
// - thiserror crate makes defining error types easy
// - The ? operator converts lower-level errors via the From impls below
//
// ERROR HANDLING POLICY:
// - API failures are returned to the caller unchanged (never retried)
// - Bad cart input is NOT an error: the cart ignores it silently
// - Looking up an unknown product is NOT an error: it yields None
// =============================================================================

use thiserror::Error;

// =============================================================================
// CUSTOM ERROR TYPE
// =============================================================================
// LEARNING NOTE:
// The #[error("...")] attribute from thiserror automatically implements
// Display trait, so we get nice error messages for free.
//
// The #[from] attribute auto-implements From<X> for conversion.
#[derive(Debug, Error)]
pub enum ShopError {
    // -------------------------------------------------------------------------
    // API ERRORS
    // -------------------------------------------------------------------------
    /// The catalog API answered with a non-2xx status
    #[error("{message}")]
    Api { code: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("Invalid response from API: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL or request path could not form a URL
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    // -------------------------------------------------------------------------
    // NAVIGATION ERRORS
    // -------------------------------------------------------------------------
    /// Absolute page request outside 1..=page_count; nothing was fetched
    #[error("Page {requested} does not exist (1 - {page_count})")]
    PageOutOfRange { requested: u32, page_count: u32 },
}

impl ShopError {
    /// Build an API error from a status code and the server's error text.
    ///
    /// 400 and 500 carry the server-provided text, other codes only the
    /// standard reason phrase.
    pub fn from_status(code: u16, server_text: &str) -> Self {
        let reason = reqwest::StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown status");

        let message = match code {
            400 => format!("Bad request: {}  ({})", server_text, reason),
            500 => format!("Server error: {}  ({})", server_text, reason),
            _ => format!("API Error: {}", reason),
        };

        ShopError::Api { code, message }
    }

    /// HTTP status code for API errors
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ShopError::Api { code, .. } => Some(*code),
            ShopError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================
// A convenient type alias for Results that use our error type.
pub type ShopResult<T> = Result<T, ShopError>;
