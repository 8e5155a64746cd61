//! # Validation Module
//!
//! Input validation utilities for Gearbox.
//!
//! ## Validation Strategy
//! Three layers catch different errors:
//!
//! 1. The collaborating form/view layer - format checks, user feedback
//! 2. THIS MODULE - business rule validation, always before any mutation
//! 3. SQLite - NOT NULL / UNIQUE / CHECK / foreign key constraints
//!
//! Quantity and price rules here are the front-line guards: a quantity ≤ 0
//! or price < 0 is rejected before the engines ever see it.

use crate::error::ValidationError;
use crate::{MAX_PART_QUANTITY, MAX_SALE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an estimate part name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 255 characters
pub fn validate_part_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates a stock entry name. Same rules as part names; uniqueness per
/// branch is the database's job.
pub fn validate_stock_name(name: &str) -> ValidationResult<()> {
    validate_part_name(name)
}

/// Validates a customer name on a sale.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an estimate part quantity.
///
/// ## Rules
/// - Must be positive (≥ 1)
/// - Must not exceed MAX_PART_QUANTITY
pub fn validate_part_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_PART_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_PART_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a quantity sold on a sale line.
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_SALE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_SALE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in kobo.
///
/// ## Rules
/// - Must be non-negative (≥ 0); zero is allowed (goodwill/free lines)
pub fn validate_price_kobo(kobo: i64) -> ValidationResult<()> {
    if kobo < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a restock delta. Restocking zero or negative units is a caller
/// bug, not a no-op.
pub fn validate_restock_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "restock amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a cash payment amount on a sale. Zero is valid (full credit
/// sale); the overpayment ceiling is checked against the sale total by the
/// coordinator once the total is known.
pub fn validate_payment_kobo(kobo: i64) -> ValidationResult<()> {
    if kobo < 0 {
        return Err(ValidationError::OutOfRange {
            field: "amount paid".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
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
// Unit Tests
// =============================================================================
