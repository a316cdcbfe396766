// =============================================================================
// VIEW MODULE
// =============================================================================
// This module is the presentation layer: it turns products and cart lines
// into something the user can see.
//
// LEARNING NOTES:
// - The catalog controller and the cart only know the CatalogView and
//   CartView traits, never a concrete UI
// - ConsoleView is the terminal implementation used by the binary; it
//   writes to any std::io::Write so tests can capture the output
// =============================================================================

use std::fmt;
use std::io::Write;

use tracing::warn;

use crate::models::{CartLine, NavState, Product, ProductsResult};

/// Number of slots in the rating widget
pub const RATING_MAX: u32 = 5;

// =============================================================================
// VIEW TRAITS
// =============================================================================

/// Everything the catalog controller renders.
pub trait CatalogView {
    /// Update the pager (called before render_products)
    fn show_nav(&mut self, nav: &NavState);

    /// Replace the product list with `result`
    fn render_products(&mut self, result: &ProductsResult, summary: &str);

    /// Fill the category picker
    fn render_categories(&mut self, categories: &[String]);

    /// Detail view after a click on a product card
    fn render_product_details(&mut self, product: &Product);
}

/// Everything the shopping cart renders.
pub trait CartView {
    /// Update the item counter next to the cart icon
    fn count_changed(&mut self, count: usize);

    /// Toggle the "in cart" marker on a product card
    fn mark_in_cart(&mut self, product_id: i64, in_cart: bool);

    /// Show the full cart with its total
    fn render_cart(&mut self, lines: &[CartLine], total: f64);

    /// Refresh only the price total
    fn render_total(&mut self, total: f64);
}

// =============================================================================
// PRODUCT CARD
// =============================================================================
/// View-model for one product in the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub product_id: i64,
    pub title: String,
    pub brand: String,
    pub price_label: String,
    /// Only present when the product is discounted
    pub discount_label: Option<String>,
    pub stars: String,
    pub stock_label: String,
    /// Stock indicator: true when fewer than the threshold are left
    pub low_stock: bool,
}

impl ProductCard {
    pub fn from_product(product: &Product, low_stock_threshold: i64) -> Self {
        let discount_label = if product.discount_percentage > 0.0 {
            Some(format!("-{:.0}%", product.discount_percentage))
        } else {
            None
        };

        Self {
            product_id: product.id,
            title: product.title.clone(),
            brand: product.brand.clone(),
            price_label: format!("${:.2}", product.price),
            discount_label,
            stars: rating_stars(product.rating, RATING_MAX),
            stock_label: format!("{} in stock", product.stock),
            low_stock: product.stock < low_stock_threshold,
        }
    }
}

impl fmt::Display for ProductCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:<4} {}", self.product_id, self.title)?;
        if !self.brand.is_empty() {
            write!(f, " ({})", self.brand)?;
        }
        write!(f, "  {}", self.price_label)?;
        if let Some(discount) = &self.discount_label {
            write!(f, " {}", discount)?;
        }
        write!(f, "  {}  {}", self.stars, self.stock_label)?;
        if self.low_stock {
            write!(f, " [LOW STOCK]")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RATING STARS
// -----------------------------------------------------------------------------
/// Render a rating as `max` star slots.
///
/// Slot i is filled when the rounded score reaches it. The last filled slot
/// is drawn as a half star when it lies above the raw score and the fraction
/// is at least one half.
pub fn rating_stars(score: f64, max: u32) -> String {
    let rounded = score.round().clamp(0.0, f64::from(max));

    (1..=max)
        .map(|slot| {
            let slot = f64::from(slot);
            if rounded >= slot {
                if slot > score && score.fract() >= 0.5 {
                    '◐'
                } else {
                    '★'
                }
            } else {
                '☆'
            }
        })
        .collect()
}

// =============================================================================
// CONSOLE VIEW
// =============================================================================
/// Terminal rendering of the storefront.
pub struct ConsoleView<W: Write> {
    out: W,
    low_stock_threshold: i64,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W, low_stock_threshold: i64) -> Self {
        Self {
            out,
            low_stock_threshold,
        }
    }

    /// Consume the view and return the writer (used by tests)
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print one line of text
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
            warn!(error = %err, "Failed to write to the console");
        }
    }

    /// Show an alert-level message (API failures and the like)
    pub fn alert(&mut self, message: &str) {
        self.line(format_args!("!! {}", message));
    }
}

impl<W: Write> CatalogView for ConsoleView<W> {
    fn show_nav(&mut self, nav: &NavState) {
        if !nav.visible {
            return;
        }
        let button = |label: &str, disabled: bool| {
            if disabled {
                format!("({})", label)
            } else {
                format!("[{}]", label)
            }
        };
        self.line(format_args!(
            "{} {} {} {} {}",
            button("first", nav.first_disabled),
            button("prev", nav.prev_disabled),
            nav.label(),
            button("next", nav.next_disabled),
            button("last", nav.last_disabled),
        ));
    }

    fn render_products(&mut self, result: &ProductsResult, summary: &str) {
        self.line(format_args!("{}", summary));

        if result.is_empty() {
            self.line(format_args!("No products found."));
            return;
        }

        for product in &result.products {
            let card = ProductCard::from_product(product, self.low_stock_threshold);
            self.line(format_args!("{}", card));
        }
    }

    fn render_categories(&mut self, categories: &[String]) {
        self.line(format_args!("- All categories -"));
        for category in categories {
            self.line(format_args!("  {}", category));
        }
    }

    fn render_product_details(&mut self, product: &Product) {
        let card = ProductCard::from_product(product, self.low_stock_threshold);
        self.line(format_args!("{}", card));
        self.line(format_args!("  Category: {}", product.category));
        self.line(format_args!("  {}", product.description));
        self.line(format_args!("  Rating: {:.2} / {}", product.rating, RATING_MAX));
        self.line(format_args!("  Image: {}", product.thumbnail));
        self.line(format_args!("  Buy with: buy {} <quantity>", product.id));
    }
}

impl<W: Write> CartView for ConsoleView<W> {
    fn count_changed(&mut self, count: usize) {
        self.line(format_args!("Cart: {} item{}", count, plural(count)));
    }

    fn mark_in_cart(&mut self, product_id: i64, in_cart: bool) {
        if in_cart {
            self.line(format_args!("#{} is in your cart", product_id));
        } else {
            self.line(format_args!("#{} removed from your cart", product_id));
        }
    }

    fn render_cart(&mut self, lines: &[CartLine], total: f64) {
        if lines.is_empty() {
            self.line(format_args!("Your cart is empty."));
        }
        for line in lines {
            self.line(format_args!(
                "#{:<4} {} x{} @ ${:.2} = ${:.2}",
                line.product_id,
                line.name,
                line.quantity,
                line.unit_price,
                line.subtotal()
            ));
        }
        self.render_total(total);
    }

    fn render_total(&mut self, total: f64) {
        self.line(format_args!("Price total: ${:.2}", total));
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
