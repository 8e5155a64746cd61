//! # Repository Module
//!
//! Database repository implementations for Gearbox.
//!
//! ## Repository Pattern
//! Each repository is a cheap handle over the shared pool that isolates the
//! SQL for one aggregate. The two engines and the coordinator live here
//! because they are exactly the places where business math ([`gearbox_core`])
//! meets persistence:
//!
//! - [`EstimateRepository`](estimate::EstimateRepository) - the
//!   recalculation engine: every part mutation ends with an explicit
//!   `recalculate` call, no hook registry
//! - [`StockRepository`](stock::StockRepository) - the deduction engine:
//!   one conditional UPDATE, never check-then-write
//! - [`SaleRepository`](sale::SaleRepository) - the sale transaction
//!   coordinator: all-or-nothing sale creation
//! - [`BranchRepository`](branch::BranchRepository) - the branch registry
//!   partitioning everything else

pub mod branch;
pub mod estimate;
pub mod sale;
pub mod stock;
