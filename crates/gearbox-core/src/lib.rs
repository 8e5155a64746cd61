//! # gearbox-core: Pure Business Logic for Gearbox
//!
//! This crate is the **heart** of Gearbox, a multi-branch dealership and
//! workshop backend. It contains the derived-value consistency rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gearbox Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │              Surrounding CRUD application (views/forms)         │    │
//! │  │   "add part to estimate", "create sale", "restock by N"         │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ gearbox-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   types   │  │   money   │  │ estimate  │  │ validation│    │    │
//! │  │   │ Estimate  │  │   Money   │  │  totals   │  │   rules   │    │    │
//! │  │   │ StockEntry│  │  VatRate  │  │  (pure)   │  │  checks   │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    gearbox-db (Database Layer)                  │    │
//! │  │   recalculation engine, stock deduction, sale coordinator       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Estimate, StockEntry, SaleRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`estimate`] - Pure estimate total computation (aggregate-level VAT)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in kobo (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod estimate;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gearbox_core::Money` instead of
// `use gearbox_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use estimate::{compute_totals, EstimateTotals};
pub use money::{Money, MoneyParseError, VatRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// The standard VAT rate in basis points: 750 bps = 7.5%.
///
/// Applied exactly once, to the aggregate subtotal, with half-up rounding.
pub const VAT_RATE_BPS: u32 = 750;

/// Maximum quantity on a single estimate part.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 10).
pub const MAX_PART_QUANTITY: i64 = 9999;

/// Maximum quantity sold on a single sale line.
pub const MAX_SALE_QUANTITY: i64 = 9999;
