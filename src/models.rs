// =============================================================================
// MODELS MODULE
// =============================================================================
// This module defines the data structures used throughout the storefront.
//
// LEARNING NOTES:
// - Rust uses structs to define data structures
// - Enums model "one of several shapes" (query modes, page directions)
// - Serde handles JSON serialization/deserialization
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// PRODUCT
// =============================================================================
// A single product as received from the catalog API.
//
// The remote API uses camelCase field names (discountPercentage), so we tell
// serde to rename every field when (de)serializing.
//
// DERIVE MACROS EXPLAINED:
// - Debug: Allows printing with {:?} for debugging
// - Clone: Allows creating copies of the struct
// - PartialEq: Allows comparing two products with ==
// - Serialize / Deserialize: JSON conversion
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier of the product
    pub id: i64,

    /// Product name shown on the card
    pub title: String,

    /// Some catalog entries (groceries) have no brand
    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub description: String,

    /// Unit price in dollars
    pub price: f64,

    #[serde(default)]
    pub discount_percentage: f64,

    /// Average customer rating, 0 to 5
    #[serde(default)]
    pub rating: f64,

    /// Units in stock (never negative)
    #[serde(default)]
    pub stock: i64,

    #[serde(default)]
    pub category: String,

    /// Thumbnail image URL
    #[serde(default)]
    pub thumbnail: String,
}

// =============================================================================
// PRODUCTS RESULT
// =============================================================================
// One page of products plus the pagination metadata the API sends along.
//
// Invariant: products.len() <= limit and products.len() <= total.
//
// LEARNING NOTE:
// This is the catalog controller's only piece of mutable state. It is always
// replaced wholesale with a freshly fetched value, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductsResult {
    /// Products on this page, in API order
    #[serde(default)]
    pub products: Vec<Product>,

    /// Total number of matching products across all pages
    pub total: u32,

    /// Number of products omitted from the front (offset)
    pub skip: u32,

    /// Page size the API applied
    pub limit: u32,
}

impl ProductsResult {
    /// True when the result holds no products at all
    pub fn is_empty(&self) -> bool {
        self.total == 0 || self.products.is_empty()
    }
}

// =============================================================================
// CART LINE
// =============================================================================
/// One product entry in the shopping cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog id of the product (always > 0)
    pub product_id: i64,

    /// Product title at the time it was added
    pub name: String,

    /// Number of units (always > 0)
    pub quantity: i32,

    /// Price of one unit (always >= 0)
    pub unit_price: f64,
}

impl CartLine {
    /// Price contribution of this line to the cart total
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

// -----------------------------------------------------------------------------
// PURCHASE INTENT
// -----------------------------------------------------------------------------
/// What checkout records locally. There is no payment processing; this is
/// only kept for the rest of the session and written to the log.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseIntent {
    /// Unique ID for this intent
    pub id: Uuid,

    /// When the checkout happened
    pub created_at: DateTime<Utc>,

    /// Snapshot of the cart lines at checkout time
    pub lines: Vec<CartLine>,

    /// Sum of all line subtotals
    pub total: f64,
}

// =============================================================================
// QUERY MODE
// =============================================================================
// Which filter produced the current result. The controller remembers it so
// that paging can re-issue the same request with only the offset changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryMode {
    /// Full catalog, no filter
    #[default]
    None,

    /// Free-text search on product names
    ByName(String),

    /// All products in one category
    ByCategory(String),
}

impl QueryMode {
    /// Build a mode from a name filter; an empty filter means "everything".
    pub fn by_name(text: &str) -> Self {
        if text.is_empty() {
            QueryMode::None
        } else {
            QueryMode::ByName(text.to_string())
        }
    }

    /// Build a mode from a category filter; an empty filter means "everything".
    pub fn by_category(category: &str) -> Self {
        if category.is_empty() {
            QueryMode::None
        } else {
            QueryMode::ByCategory(category.to_string())
        }
    }

    /// Path segments of the API endpoint that serves this mode
    ///
    /// The category is kept as a single segment so the client encodes it
    /// whole, slashes included.
    pub fn path(&self) -> Vec<&str> {
        match self {
            QueryMode::None => vec!["products"],
            QueryMode::ByName(_) => vec!["products", "search"],
            QueryMode::ByCategory(category) => vec!["products", "category", category.as_str()],
        }
    }

    /// Query parameters for one page of this mode
    pub fn params(&self, limit: u32, skip: u32) -> QueryParams {
        let mut params = QueryParams::new();
        if let QueryMode::ByName(text) = self {
            params.insert("q", text.as_str());
        }
        params.insert("limit", limit.to_string());
        params.insert("skip", skip.to_string());
        params
    }

    /// Short label used for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            QueryMode::None => "all",
            QueryMode::ByName(_) => "name",
            QueryMode::ByCategory(_) => "category",
        }
    }
}

// -----------------------------------------------------------------------------
// PAGE DIRECTION
// -----------------------------------------------------------------------------
/// Relative navigation targets of the result pager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Prev,
    Next,
    First,
    Last,
}

// =============================================================================
// NAV STATE
// =============================================================================
// Projection of the current result onto the pager buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    /// Pager is only shown when there is more than one page's worth
    pub visible: bool,
    pub first_disabled: bool,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub last_disabled: bool,

    /// 1-based page number of the current result
    pub current_page: u32,

    /// Number of result pages (at least 1)
    pub page_count: u32,
}

impl NavState {
    /// Text for the "goto page" button
    pub fn label(&self) -> String {
        format!("Page {} / {}", self.current_page, self.page_count)
    }
}

// =============================================================================
// API QUERY PARAMETERS
// =============================================================================
// Query parameters map a key to one value or to several values. Several
// values are sent as repeated parameters: ?id=1&id=2

/// Value of one query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Multi(values)
    }
}

/// Ordered set of query parameters
///
/// A BTreeMap keeps the generated URLs deterministic, which makes request
/// matching in tests straightforward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into (key, value) pairs, repeating keys with several values
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            match value {
                QueryValue::Single(v) => pairs.push((key.as_str(), v.as_str())),
                QueryValue::Multi(values) => {
                    for v in values {
                        pairs.push((key.as_str(), v.as_str()));
                    }
                }
            }
        }
        pairs
    }
}

// =============================================================================
// API RESPONSE HELPERS
// =============================================================================

/// Error body the catalog API sends with non-2xx responses
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Optional error text from the server
    #[serde(default)]
    pub error: Option<String>,

    /// dummyjson uses `message` on some endpoints
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn text(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("")
    }
}

/// A category entry. Older API versions send plain slugs, newer ones send
/// objects; both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryEntry {
    Slug(String),
    Detailed { slug: String },
}

impl CategoryEntry {
    pub fn into_slug(self) -> String {
        match self {
            CategoryEntry::Slug(slug) | CategoryEntry::Detailed { slug } => slug,
        }
    }
}

// =============================================================================
// HEALTH CHECK RESPONSE
// =============================================================================

/// Simple health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
