//! # Money Module
//!
//! Shekel amounts as integer agorot. Floating point never touches a
//! price: JavaScript storefronts have charged enough customers
//! `0.30000000000000004` already.
//!
//! Two rounding rules live here and nowhere else:
//! - [`Money::percentage`] rounds half-up when a discount lands between
//!   agorot.
//! - [`Money::ceil_to_unit`] rounds a cart total UP to the next whole
//!   shekel, applied exactly once per cart, at the end.
//!
//! ```rust
//! use sticker_core::money::Money;
//!
//! let sticker = Money::from_shekels(10);
//! let eight = sticker * 8;                       // ₪80.00
//! let payable = eight.apply_percentage_discount(1000); // 10% off
//! assert_eq!(payable.ceil_to_unit(), Money::from_shekels(72));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Agorot per shekel.
const UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// An amount of money in agorot.
///
/// Signed so that corrections and differences are representable; catalog
/// prices and cart totals themselves never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Amount from agorot.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Amount from whole shekels. Catalog prices are whole-shekel, so
    /// most construction goes through here.
    #[inline]
    pub const fn from_shekels(shekels: i64) -> Self {
        Money(shekels * UNIT)
    }

    /// The amount in agorot.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole-shekel part, truncated toward zero.
    #[inline]
    pub const fn shekels(&self) -> i64 {
        self.0 / UNIT
    }

    /// Agorot past the whole shekel, 0..=99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % UNIT).abs()
    }

    /// ₪0.00.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Line total: this unit price times `qty`.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// The given fraction of this amount, in basis points (2500 = 25%),
    /// rounded half-up to the nearest agora.
    pub fn percentage(&self, bps: u32) -> Money {
        // i128 keeps amount * bps out of overflow territory
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// This amount minus a basis-point discount.
    ///
    /// `Money::from_shekels(80).apply_percentage_discount(1000)` is ₪72.
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        *self - self.percentage(discount_bps)
    }

    /// Rounds UP to the next whole shekel; whole amounts pass through.
    ///
    /// Negative amounts also pass through unchanged. They never occur on
    /// cart totals, and rounding them would only manufacture surprises.
    pub const fn ceil_to_unit(&self) -> Money {
        if self.0 % UNIT == 0 || self.0 < 0 {
            Money(self.0)
        } else {
            Money((self.0 / UNIT + 1) * UNIT)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `₪197.50` style output, for logs. The storefront does its own price
/// formatting and localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₪{}.{:02}", sign, self.shekels().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_parts() {
        let price = Money::from_cents(1250);
        assert_eq!(price.cents(), 1250);
        assert_eq!(price.shekels(), 12);
        assert_eq!(price.cents_part(), 50);

        assert_eq!(Money::from_shekels(7), Money::from_cents(700));
        assert!(Money::default().is_zero());
    }

    #[test]
    fn test_display_for_logs() {
        assert_eq!(Money::from_cents(19_750).to_string(), "₪197.50");
        assert_eq!(Money::from_shekels(8).to_string(), "₪8.00");
        assert_eq!(Money::from_cents(-325).to_string(), "-₪3.25");
    }

    #[test]
    fn test_arithmetic_ops() {
        let regular = Money::from_shekels(80);
        let special = Money::from_shekels(40);

        assert_eq!(regular + special, Money::from_shekels(120));
        assert_eq!(regular - special, Money::from_shekels(40));
        assert_eq!(Money::from_shekels(10) * 21, Money::from_shekels(210));
        assert_eq!(
            Money::from_cents(750).multiply_quantity(4),
            Money::from_cents(3000)
        );

        let mut acc = Money::zero();
        acc += Money::from_cents(30);
        acc -= Money::from_cents(10);
        assert_eq!(acc.cents(), 20);
    }

    #[test]
    fn test_percentage_in_basis_points() {
        // 25% of ₪210 is ₪52.50
        assert_eq!(Money::from_shekels(210).percentage(2500).cents(), 5250);
        assert!(Money::from_shekels(210).percentage(0).is_zero());
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 10% of 333 agorot is 33.3, down to 33
        assert_eq!(Money::from_cents(333).percentage(1000).cents(), 33);
        // 10% of 335 agorot is 33.5, up to 34
        assert_eq!(Money::from_cents(335).percentage(1000).cents(), 34);
    }

    #[test]
    fn test_discount_application() {
        assert_eq!(
            Money::from_shekels(80).apply_percentage_discount(1000),
            Money::from_shekels(72)
        );
        // 0% is the identity
        assert_eq!(
            Money::from_cents(1234).apply_percentage_discount(0).cents(),
            1234
        );
    }

    #[test]
    fn test_ceil_to_unit() {
        // ₪197.50 is charged as ₪198
        assert_eq!(Money::from_cents(19_750).ceil_to_unit().cents(), 19_800);
        // A single agora over a whole shekel still rounds a full unit up
        assert_eq!(Money::from_cents(7201).ceil_to_unit().cents(), 7300);
        // Whole amounts and zero pass through
        assert_eq!(Money::from_shekels(72).ceil_to_unit().cents(), 7200);
        assert!(Money::zero().ceil_to_unit().is_zero());
        // Negative amounts are left alone
        assert_eq!(Money::from_cents(-150).ceil_to_unit().cents(), -150);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::from_cents(1).is_negative());
        assert!(!Money::zero().is_negative());
    }
}
