// =============================================================================
// STOREFRONT LIBRARY
// =============================================================================
// A terminal storefront over a remote JSON product catalog: paginated and
// filterable product listings plus an in-memory shopping cart.
//
// MODULE MAP (leaf to root):
// - api:      HTTP/JSON client for the catalog API
// - cart:     shopping cart line items and checkout
// - catalog:  current result, page arithmetic and navigation
// - view:     presentation traits and the console implementation
// - shop:     the context object and command dispatch
// =============================================================================

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod shop;
pub mod view;

pub use error::{ShopError, ShopResult};
