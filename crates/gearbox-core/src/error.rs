//! # Error Types
//!
//! Domain-specific error types for gearbox-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gearbox-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  gearbox-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                     │
//! │  ├── StockError       - Stock deduction failures                        │
//! │  └── SaleError        - Per-line sale transaction failures              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StockError/SaleError → caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (stock name, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Failed invariant checks abort the operation; nothing logs-and-continues

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. The surrounding view/handler
/// owns user-facing messaging; these carry everything it needs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Insufficient stock to satisfy a deduction.
    ///
    /// Recoverable by the caller: reject the sale line, let the user correct
    /// the quantity. The requested amount is never silently clamped.
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cash paid exceeds the sale total. Rejected; previous values retained.
    #[error("amount paid {paid} exceeds sale total {total}")]
    Overpayment { paid: Money, total: Money },

    /// An invariant the storage guards were supposed to hold was observed
    /// broken (negative subtotal, stock below zero). A programming error,
    /// not a user error - surfaced loudly, never swallowed.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements, and are checked
/// before any mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Brake Pad".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Brake Pad: available 3, requested 5"
        );

        let err = CoreError::Overpayment {
            paid: Money::from_kobo(60_000),
            total: Money::from_kobo(50_000),
        };
        assert_eq!(err.to_string(), "amount paid ₦600.00 exceeds sale total ₦500.00");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
