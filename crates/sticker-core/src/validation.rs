//! # Validation Module
//!
//! Boundary checks for everything that enters the engine: quantities,
//! prices, checkout fields, whole carts. The pricing and admission rules
//! assume positive quantities; this module is where that assumption is
//! made true.
//!
//! The storefront UI repeats the cheap checks for instant feedback and the
//! database schema backstops the numeric ones with CHECK constraints, but
//! this layer is the one the engine trusts.

use crate::cart::Cart;
use crate::error::ValidationError;
use crate::types::NewOrder;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// A cart or order quantity: strictly positive, capped at
/// [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// A price in agorot. Zero is fine (giveaway stickers exist); negative is
/// not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// A stock level. Zero means sold out, which is a valid state.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// A product or customer name: non-blank, at most 200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// A phone number the admin can actually call back: 7 to 20 characters,
/// digits with spaces and dashes, optionally a leading `+`.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() < 7 || phone.len() > 20 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 7-20 characters".to_string(),
        });
    }

    let mut chars = phone.chars();
    let first = chars.next().unwrap_or(' ');
    let first_ok = first.is_ascii_digit() || first == '+';
    if !first_ok || !chars.all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, dashes and a leading +".to_string(),
        });
    }

    Ok(())
}

/// A UUID in string form.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Checkout fields for a new order.
///
/// Name and phone are always required; the four address fields are
/// required exactly when the chosen delivery option ships, and ignored
/// otherwise.
pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    validate_name("customer_name", &order.customer_name)?;
    validate_phone(&order.phone)?;

    if order.delivery_option.requires_address() {
        require_field("city", order.city.as_deref())?;
        require_field("street", order.street.as_deref())?;
        require_field("house_number", order.house_number.as_deref())?;
        require_field("zip_code", order.zip_code.as_deref())?;
    }

    Ok(())
}

/// A cart about to be checked out: non-empty, every line quantity valid.
pub fn validate_cart(cart: &Cart) -> ValidationResult<()> {
    if cart.is_empty() {
        return Err(ValidationError::Required {
            field: "cart".to_string(),
        });
    }

    for line in &cart.lines {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

fn require_field(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::regular_product;
    use crate::types::{DeliveryOption, PaymentMethod};

    fn new_order(delivery: DeliveryOption) -> NewOrder {
        NewOrder {
            customer_name: "Dana Levi".to_string(),
            phone: "+972 50-123-4567".to_string(),
            delivery_option: delivery,
            payment_method: PaymentMethod::Bit,
            city: None,
            street: None,
            house_number: None,
            zip_code: None,
        }
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_price_and_stock_allow_zero_but_not_negative() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1050).is_ok());
        assert!(validate_price_cents(-1).is_err());

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-5).is_err());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("name", "Gold Foil Crest").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(201)).is_err());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("+972501234567").is_ok());
        assert!(validate_phone("050-123-4567").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me maybe").is_err());
    }

    #[test]
    fn test_uuid_rules() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_pickup_order_needs_no_address() {
        assert!(validate_new_order(&new_order(DeliveryOption::SelfPickup)).is_ok());
    }

    #[test]
    fn test_shipped_order_requires_full_address() {
        let mut order = new_order(DeliveryOption::IsraelPost);
        assert!(validate_new_order(&order).is_err());

        order.city = Some("Haifa".to_string());
        order.street = Some("HaNamal".to_string());
        order.house_number = Some("12".to_string());
        order.zip_code = Some("3303112".to_string());
        assert!(validate_new_order(&order).is_ok());

        // Whitespace does not satisfy a required field
        order.zip_code = Some("  ".to_string());
        assert!(validate_new_order(&order).is_err());
    }

    #[test]
    fn test_cart_must_have_lines() {
        assert!(validate_cart(&Cart::new()).is_err());

        let mut cart = Cart::new();
        cart.add_line(&regular_product("r1", 1000, 99), 2);
        assert!(validate_cart(&cart).is_ok());
    }
}
