// =============================================================================
// SHOPPING CART MODULE
// =============================================================================
// Keeps the products the user is "buying" for the rest of the session.
//
// LEARNING NOTES:
// - Lines live in a Vec so display order is insertion order
// - Invalid input is ignored silently (no Result): a bad quantity typed into
//   a form should never crash or abort anything
// - Every change that affects the cart icon is pushed to the CartView
// =============================================================================

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics;
use crate::models::{CartLine, PurchaseIntent};
use crate::view::CartView;

pub struct ShoppingCart<V: CartView> {
    lines: Vec<CartLine>,
    intents: Vec<PurchaseIntent>,
    view: V,
}

impl<V: CartView> ShoppingCart<V> {
    pub fn new(view: V) -> Self {
        Self {
            lines: Vec::new(),
            intents: Vec::new(),
            view,
        }
    }

    // -------------------------------------------------------------------------
    // QUERIES
    // -------------------------------------------------------------------------

    /// Number of distinct products in the cart (not the sum of quantities)
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantity * unit price over all lines
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Checkouts recorded during this session, oldest first
    pub fn intents(&self) -> &[PurchaseIntent] {
        &self.intents
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    // -------------------------------------------------------------------------
    // MUTATIONS
    // -------------------------------------------------------------------------

    /// Add a product to the cart.
    ///
    /// Ignored when the id or quantity is not positive or the price is not a
    /// finite, non-negative number. Adding a product that is already in the
    /// cart increases that line's quantity instead of creating a second line.
    ///
    /// Returns whether the input was accepted.
    pub fn add_line(&mut self, product_id: i64, name: &str, quantity: i32, unit_price: f64) -> bool {
        if product_id <= 0 || quantity <= 0 || !unit_price.is_finite() || unit_price < 0.0 {
            debug!(product_id, quantity, unit_price, "Ignoring invalid cart line");
            return false;
        }

        match self.lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.name = name.to_string();
                line.unit_price = unit_price;
            }
            None => self.lines.push(CartLine {
                product_id,
                name: name.to_string(),
                quantity,
                unit_price,
            }),
        }

        info!(product_id, quantity, "Added product to cart");
        self.changed();
        self.view.mark_in_cart(product_id, true);
        true
    }

    /// Remove a product from the cart; no-op if it isn't there.
    pub fn remove_line(&mut self, product_id: i64) {
        let Some(idx) = self.lines.iter().position(|line| line.product_id == product_id) else {
            return;
        };

        self.lines.remove(idx);
        info!(product_id, "Removed product from cart");
        self.changed();
        self.view.mark_in_cart(product_id, false);
    }

    /// Change the quantity of a line; quantities below 1 become 1.
    ///
    /// Removing a product is a separate, explicit operation.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.product_id == product_id) {
            line.quantity = quantity.max(1);
            metrics::set_cart_state(self.lines.len(), self.total_price());
        }
    }

    /// Handle a quantity typed into the cart form.
    ///
    /// Zero or less removes the product and redraws the cart, anything else
    /// updates the quantity and redraws the total.
    pub fn apply_quantity_input(&mut self, product_id: i64, quantity: i32) {
        if product_id <= 0 {
            return;
        }

        if quantity <= 0 {
            self.remove_line(product_id);
            self.show();
        } else if self.contains(product_id) {
            self.set_quantity(product_id, quantity);
            let total = self.total_price();
            self.view.render_total(total);
        }
    }

    // -------------------------------------------------------------------------
    // DISPLAY & CHECKOUT
    // -------------------------------------------------------------------------

    /// Render the whole cart
    pub fn show(&mut self) {
        let total = self.total_price();
        self.view.render_cart(&self.lines, total);
    }

    /// Record the purchase intent and empty the cart.
    ///
    /// Nothing is charged or sent anywhere. Returns None for an empty cart.
    pub fn checkout(&mut self) -> Option<PurchaseIntent> {
        if self.lines.is_empty() {
            return None;
        }

        let total = self.total_price();
        let lines = std::mem::take(&mut self.lines);
        let intent = PurchaseIntent {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            lines,
            total,
        };

        info!(
            intent_id = %intent.id,
            lines = intent.lines.len(),
            total = intent.total,
            "Recorded purchase intent"
        );
        metrics::record_purchase_intent();

        self.changed();
        for line in &intent.lines {
            self.view.mark_in_cart(line.product_id, false);
        }

        self.intents.push(intent.clone());
        Some(intent)
    }

    /// Push the new count to the view and the gauges
    fn changed(&mut self) {
        metrics::set_cart_state(self.lines.len(), self.total_price());
        self.view.count_changed(self.lines.len());
    }
}
