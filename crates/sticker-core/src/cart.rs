//! # Cart Module
//!
//! The cart value type the pricing and admission rules operate on.
//!
//! ## Ownership
//! The engine never owns cart persistence: the storefront keeps cart state
//! wherever it likes (client session, local storage) and passes a `Cart`
//! value into every engine call. All mutations here are plain value
//! mutations with no I/O.
//!
//! ## Invariants
//! - Lines are unique by product id (adding the same product merges quantity)
//! - Quantity is always positive (updating to 0 removes the line)
//! - Special lines are only kept while the cart holds at least
//!   [`MIN_REGULAR_FOR_SPECIAL`](crate::MIN_REGULAR_FOR_SPECIAL) regular
//!   items; see [`Cart::evict_ineligible_specials`]

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;
use crate::MIN_REGULAR_FOR_SPECIAL;

/// A line in the shopping cart.
///
/// Holds a snapshot of the product at the time it was added, so the cart
/// displays consistent data even if the catalog changes underneath it.
/// Live stock is re-checked against the store at checkout regardless.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Product snapshot at the time of adding.
    pub product: Product,

    /// Quantity in cart. Always positive.
    pub quantity: i64,
}

impl CartLine {
    /// Line subtotal before any discount (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }
}

/// The shopping cart: an unordered set of lines keyed by product id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    /// Lines in the cart. No two lines share a product id.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart, merging quantity if already present.
    ///
    /// This applies the mutation only; whether the addition is allowed is
    /// decided beforehand by [`crate::admission::can_add`]. Callers must
    /// not call this with a quantity the policy denied.
    pub fn add_line(&mut self, product: &Product, quantity: i64) {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity += quantity;
            return;
        }
        self.lines.push(CartLine {
            product: product.clone(),
            quantity,
        });
    }

    /// Sets the quantity of a line. Quantity 0 removes the line.
    ///
    /// ## Returns
    /// `true` if a line with the given product id existed.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_line(product_id);
        }
        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes a line by product id. Returns `true` if a line was removed.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        self.lines.len() != before
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Removes special lines that lost their eligibility and returns them.
    ///
    /// A special line may only exist while the cart holds at least
    /// [`MIN_REGULAR_FOR_SPECIAL`](crate::MIN_REGULAR_FOR_SPECIAL) regular
    /// items. When a mutation drops the regular count below that threshold
    /// the specials are evicted rather than left in an inconsistent cart;
    /// callers surface the returned lines to the customer.
    pub fn evict_ineligible_specials(&mut self) -> Vec<CartLine> {
        if self.regular_quantity() >= MIN_REGULAR_FOR_SPECIAL {
            return Vec::new();
        }
        let (evicted, kept): (Vec<_>, Vec<_>) =
            self.lines.drain(..).partition(|l| l.product.is_special());
        self.lines = kept;
        evicted
    }

    /// Looks up a line by product id.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    /// Quantity of the given product already in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    /// Total quantity over regular (non-special) lines.
    pub fn regular_quantity(&self) -> i64 {
        self.lines
            .iter()
            .filter(|l| !l.product.is_special())
            .map(|l| l.quantity)
            .sum()
    }

    /// Total quantity over special lines.
    pub fn special_quantity(&self) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.product.is_special())
            .map(|l| l.quantity)
            .sum()
    }

    /// Subtotal over regular lines, before discount.
    pub fn regular_subtotal(&self) -> Money {
        self.lines
            .iter()
            .filter(|l| !l.product.is_special())
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Subtotal over special lines. Specials are never discounted.
    pub fn special_subtotal(&self) -> Money {
        self.lines
            .iter()
            .filter(|l| l.product.is_special())
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product.id == product_id)
    }
}
