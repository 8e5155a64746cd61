//! # Database Error Types
//!
//! Error types for database operations and the two engines that live on top
//! of them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← adds context and categorization                │
//! │       │                                                                 │
//! │       ├──► StockError ← deduction outcomes (insufficient / missing)     │
//! │       │                                                                 │
//! │       └──► SaleError  ← per-line coordinator outcomes                   │
//! │                                                                         │
//! │  The surrounding view/handler renders the user-facing message.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use gearbox_core::{CoreError, Money, ValidationError};

/// Database operation errors.
///
/// These wrap sqlx errors and provide additional context for debugging and
/// user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate branch name, duplicate stock
    /// name within a branch, ...).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored invariant was observed broken (negative stock, negative
    /// subtotal). Indicates the atomicity guards were bypassed; surfaced
    /// loudly, never swallowed.
    #[error("consistency violation: {0}")]
    Consistency(String),

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Recalculation Engine Errors
// =============================================================================

/// Failures from estimate mutations and recalculation.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// No such estimate.
    #[error("estimate not found: {0}")]
    NotFound(String),

    /// No such part.
    #[error("estimate part not found: {0}")]
    PartNotFound(String),

    /// A finalized estimate's parts are frozen; mutations are rejected.
    #[error("estimate {0} is finalized, parts can no longer change")]
    Finalized(String),

    /// Input failed validation before any mutation ran.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Business rule violation surfaced by the pure computation (notably a
    /// consistency violation on a negative subtotal).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Stock Deduction Errors
// =============================================================================

/// Outcomes of a stock deduction that the caller must handle.
#[derive(Debug, Error)]
pub enum StockError {
    /// The entry holds fewer units than requested. The row is left
    /// unchanged; the requested amount is never clamped.
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    Insufficient {
        id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// No such stock entry.
    #[error("stock entry not found: {0}")]
    NotFound(String),

    /// The deduction amount itself is invalid (≤ 0); rejected before any I/O.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Underlying storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Sale Coordinator Errors
// =============================================================================

/// Failures from the sale transaction coordinator.
///
/// Line-level variants carry the zero-based index of the **first failing
/// line in submission order**, so the caller can render an actionable
/// message. Whenever one of these is returned, nothing was persisted: no
/// sale row, no items, and every stock deduction already applied inside the
/// transaction has been rolled back.
#[derive(Debug, Error)]
pub enum SaleError {
    /// A sale needs at least one line.
    #[error("a sale must contain at least one item")]
    EmptySale,

    /// A line failed validation before any mutation ran.
    #[error("line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: ValidationError,
    },

    /// The line's stock entry does not exist in the sale's branch. Stock
    /// names repeat across branches, so an id outside the branch is treated
    /// the same as a missing one.
    #[error("line {line}: stock {stock_id} not found in branch {branch_id}")]
    StockNotFound {
        line: usize,
        stock_id: String,
        branch_id: String,
    },

    /// The line requested more units than the entry holds.
    #[error(
        "line {line}: insufficient stock for {name}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        line: usize,
        stock_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Header-level validation failure (customer name, payment amount).
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Cash paid exceeds the sale total; previous values are retained.
    #[error("amount paid {paid} exceeds sale total {total}")]
    Overpayment { paid: Money, total: Money },

    /// Sale not found (payment updates against a missing record).
    #[error("sale not found: {0}")]
    SaleNotFound(String),

    /// Underlying storage failure, including transaction timeouts - treated
    /// identically to a line failure: full rollback, no partial state.
    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Unit Tests
// =============================================================================
