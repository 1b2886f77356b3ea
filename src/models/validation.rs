use rust_decimal::Decimal;
use std::str::FromStr;

use super::{ValidationError, ValidationResult};

/// Reject a blank form field. Returns the trimmed value.
pub fn validate_required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    Ok(trimmed)
}

/// Parse the price typed into a form. Only the decimal syntax is checked.
pub fn parse_price(raw: &str) -> ValidationResult<Decimal> {
    let trimmed = validate_required("price", raw)?;

    Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidValue {
        field: "price".to_string(),
        value: raw.to_string(),
        reason: "Price must be a decimal number".to_string(),
    })
}

/// Prices of new entries may be zero but not negative
pub fn validate_price(price: &Decimal) -> ValidationResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::InvalidValue {
            field: "price".to_string(),
            value: price.to_string(),
            reason: "Price cannot be negative".to_string(),
        });
    }
    Ok(())
}
