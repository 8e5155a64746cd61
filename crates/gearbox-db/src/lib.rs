//! # gearbox-db: Database Layer for Gearbox
//!
//! This crate provides database access for the Gearbox dealership system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gearbox Data Flow                                │
//! │                                                                         │
//! │  Caller (create_sale, add_part, deduct ...)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    gearbox-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (estimate.rs, │    │  (embedded)  │  │   │
//! │  │   │               │    │  stock.rs,    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  sale.rs,     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │  branch.rs)   │    │              │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                                ▼                               │   │
//! │  │                     gearbox-core (pure math)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and engine error types
//! - [`repository`] - Repository implementations (estimate, stock, sale,
//!   branch)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gearbox_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/gearbox.db")).await?;
//!
//! // Use repositories
//! let sale = db.sales().create_sale(header, &lines).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, EstimateError, SaleError, StockError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::branch::BranchRepository;
pub use repository::estimate::{EstimateRepository, NewEstimate, PartFields};
pub use repository::sale::SaleRepository;
pub use repository::stock::{NewStockEntry, StockRepository};
