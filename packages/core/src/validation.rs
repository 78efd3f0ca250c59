// ABOUTME: Domain input validation for vehicles, quotes and collections
// ABOUTME: Plate formats, model years, quote lines and collection fees

use chrono::{Datelike, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use thiserror::Error;

use crate::money::MAX_AMOUNT;
use crate::types::UserRole;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid plate: {0}")]
    InvalidPlate(String),

    #[error("Invalid vehicle year: {0}")]
    InvalidYear(i32),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Unit price cannot be negative")]
    NegativePrice,

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("no fee selected")]
    MissingFee,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Role {role} is not allowed (expected one of: {allowed})")]
    RoleNotAllowed { role: UserRole, allowed: String },
}

fn plate_regex() -> &'static Regex {
    static PLATE: OnceLock<Regex> = OnceLock::new();
    // AAA9999 (legacy) or AAA9A99 (Mercosul)
    PLATE.get_or_init(|| Regex::new(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$").expect("valid regex"))
}

/// Strip separators and upper-case a plate
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Validate a plate and return its normalized form
pub fn validate_plate(plate: &str) -> Result<String, ValidationError> {
    let normalized = normalize_plate(plate);
    if plate_regex().is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::InvalidPlate(plate.to_string()))
    }
}

pub fn validate_vehicle_year(year: i32) -> Result<(), ValidationError> {
    let max_year = Utc::now().year() + 1;
    if (1900..=max_year).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::InvalidYear(year))
    }
}

pub fn validate_quote_item(
    description: &str,
    quantity: i64,
    unit_price: Decimal,
) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyField("Item description"));
    }
    if quantity < 1 {
        return Err(ValidationError::InvalidQuantity);
    }
    if unit_price < Decimal::ZERO {
        return Err(ValidationError::NegativePrice);
    }
    if unit_price > MAX_AMOUNT {
        return Err(ValidationError::InvalidAmount(unit_price.to_string()));
    }
    Ok(())
}

/// A collection fee must be chosen, strictly positive and at most `MAX_AMOUNT`
pub fn validate_collection_fee(fee: Option<Decimal>) -> Result<Decimal, ValidationError> {
    match fee {
        Some(value) if value > MAX_AMOUNT => Err(ValidationError::InvalidAmount(value.to_string())),
        Some(value) if value > Decimal::ZERO => Ok(value),
        _ => Err(ValidationError::MissingFee),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plate_formats() {
        assert_eq!(validate_plate("abc-1234").unwrap(), "ABC1234");
        assert_eq!(validate_plate("BRA 2E19").unwrap(), "BRA2E19");
        assert!(validate_plate("AB1234").is_err());
        assert!(validate_plate("ABCD123").is_err());
        assert!(validate_plate("ABC12E4").is_err());
    }

    #[test]
    fn test_vehicle_year_bounds() {
        assert!(validate_vehicle_year(2015).is_ok());
        assert!(validate_vehicle_year(1899).is_err());
        assert!(validate_vehicle_year(Utc::now().year() + 2).is_err());
    }

    #[test]
    fn test_quote_item_rules() {
        assert!(validate_quote_item("Oil change", 1, dec!(120)).is_ok());
        assert!(validate_quote_item("Labour", 1, Decimal::ZERO).is_ok());
        assert_eq!(
            validate_quote_item("  ", 1, dec!(1)),
            Err(ValidationError::EmptyField("Item description"))
        );
        assert_eq!(
            validate_quote_item("Pads", 0, dec!(1)),
            Err(ValidationError::InvalidQuantity)
        );
        assert_eq!(
            validate_quote_item("Pads", 1, dec!(-5)),
            Err(ValidationError::NegativePrice)
        );
        assert!(matches!(
            validate_quote_item("Engine", 2, Decimal::MAX),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_collection_fee_required() {
        assert_eq!(validate_collection_fee(Some(dec!(80))).unwrap(), dec!(80));
        assert_eq!(validate_collection_fee(None), Err(ValidationError::MissingFee));
        assert_eq!(
            validate_collection_fee(Some(Decimal::ZERO)),
            Err(ValidationError::MissingFee)
        );
        assert!(matches!(
            validate_collection_fee(Some(Decimal::MAX)),
            Err(ValidationError::InvalidAmount(_))
        ));
        assert_eq!(ValidationError::MissingFee.to_string(), "no fee selected");
    }
}
