//! # Domain Types
//!
//! Core domain types used throughout Gearbox.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Estimate     │   │   StockEntry    │   │   SaleRecord    │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │        │
//! │  │  apply_vat      │   │  branch_id      │   │  branch_id      │        │
//! │  │  vat_kobo     ← derived │ quantity ≥ 0 │  │  total_kobo   ← derived │
//! │  │  total_with_vat ← derived │ unit_value │  │  credit_owed  ← derived │
//! │  └────────┬────────┘   └─────────────────┘   └────────┬────────┘        │
//! │           │ owns                                      │ owns            │
//! │  ┌────────┴────────┐                         ┌────────┴────────┐        │
//! │  │  EstimatePart   │                         │    SaleItem     │        │
//! │  │  name/price/qty │                         │  price snapshot │        │
//! │  └─────────────────┘                         └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity is partitioned by a branch. Derived fields are never set by
//! callers; the recalculation engine and sale coordinator own them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Branch & Access Scope
// =============================================================================

/// A physical location partitioning stock, estimates, staff, and sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Branch {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Branch display name (unique), e.g. "ALAKA".
    pub name: String,

    /// When the branch was registered.
    pub created_at: DateTime<Utc>,
}

/// Staff access level, mirror of the account system's roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Sees and mutates all branches.
    Admin,
    /// Sees all branches (reporting oversight).
    Manager,
    /// Workshop staff, scoped to their own branch.
    Workshop,
    /// Store/sales staff, scoped to their own branch.
    Store,
}

impl AccessLevel {
    /// Whether this level may see every branch.
    pub const fn sees_all_branches(&self) -> bool {
        matches!(self, AccessLevel::Admin | AccessLevel::Manager)
    }
}

/// The branch partition visible to a caller.
///
/// Every query from the surrounding application is expected to be
/// pre-filtered through one of these. The same stock *name* may exist once
/// per branch as distinct rows, so an unscoped lookup by name is a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchScope {
    /// Elevated roles: no branch filter.
    All,
    /// Everyone else: exactly one branch.
    Branch(String),
}

impl BranchScope {
    /// Derives the scope for a user from their access level and home branch.
    pub fn for_user(level: AccessLevel, branch_id: &str) -> Self {
        if level.sees_all_branches() {
            BranchScope::All
        } else {
            BranchScope::Branch(branch_id.to_string())
        }
    }

    /// Checks whether a given branch falls inside this scope.
    pub fn allows(&self, branch_id: &str) -> bool {
        match self {
            BranchScope::All => true,
            BranchScope::Branch(own) => own == branch_id,
        }
    }
}

// =============================================================================
// Estimate
// =============================================================================

/// A priced worksheet of parts/labour for one vehicle service job.
///
/// `vat_kobo` and `total_with_vat_kobo` are derived: they must always equal
/// the VAT function of the parts sum. The recalculation engine maintains
/// them; nothing else writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Estimate {
    pub id: String,
    /// The vehicle/job record this estimate was created with.
    pub vehicle_id: String,
    pub branch_id: String,
    /// Whether the 7.5% VAT applies to this estimate.
    pub apply_vat: bool,
    /// Derived: VAT on the parts subtotal (0 when `apply_vat` is false).
    pub vat_kobo: i64,
    /// Derived: parts subtotal + VAT.
    pub total_with_vat_kobo: i64,
    /// An estimate converted to an invoice is finalized; its parts are frozen.
    pub is_finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    /// Returns the VAT amount as Money.
    #[inline]
    pub fn vat_amount(&self) -> Money {
        Money::from_kobo(self.vat_kobo)
    }

    /// Returns the VAT-inclusive grand total as Money.
    #[inline]
    pub fn total_with_vat(&self) -> Money {
        Money::from_kobo(self.total_with_vat_kobo)
    }
}

/// One priced row within an estimate. Pure value object, no side effects;
/// deleting the estimate deletes its parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EstimatePart {
    pub id: String,
    pub estimate_id: String,
    pub name: String,
    /// Unit price in kobo, ≥ 0.
    pub price_kobo: i64,
    /// Units of this part, ≥ 1.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl EstimatePart {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_kobo(self.price_kobo)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Stock
// =============================================================================

/// A named inventory quantity held at one branch.
///
/// `quantity >= 0` at all times; every decrement goes through the stock
/// deduction engine's conditional update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub id: String,
    pub branch_id: String,
    /// Unique per branch, not globally.
    pub name: String,
    pub quantity: i64,
    pub unit_value_kobo: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockEntry {
    /// Returns the unit value as Money.
    #[inline]
    pub fn unit_value(&self) -> Money {
        Money::from_kobo(self.unit_value_kobo)
    }
}

// =============================================================================
// Sales
// =============================================================================

/// One customer transaction; aggregates one or more sale items.
///
/// `total_kobo` and `credit_owed_kobo` are derived by the sale coordinator:
/// `total == Σ item price×qty` and `credit_owed == total - amount_paid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleRecord {
    pub id: String,
    pub branch_id: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub marketer: Option<String>,
    pub amount_paid_kobo: i64,
    /// Derived: total - amount paid.
    pub credit_owed_kobo: i64,
    /// Derived: sum of committed item line totals.
    pub total_kobo: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_kobo(self.amount_paid_kobo)
    }

    #[inline]
    pub fn credit_owed(&self) -> Money {
        Money::from_kobo(self.credit_owed_kobo)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_kobo(self.total_kobo)
    }
}

/// Caller input for one line of a sale: which stock entry, how many, at
/// what agreed price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineSpec {
    pub stock_id: String,
    pub quantity: i64,
    pub price_kobo: i64,
}

/// Header fields for a new sale. Totals are not accepted here; the
/// coordinator derives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub branch_id: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub marketer: Option<String>,
    pub amount_paid_kobo: i64,
}

/// A sale item that has not yet deducted stock.
///
/// ## Pending → Committed
/// The draft is consumed exactly once by [`SaleItemDraft::commit`], which is
/// the only way to mint a [`SaleItem`]. The coordinator deducts stock during
/// that transition, so re-saving an existing item can never re-deduct.
#[derive(Debug, Clone)]
pub struct SaleItemDraft {
    stock_id: String,
    quantity: i64,
    price_kobo: i64,
}

impl SaleItemDraft {
    /// Builds a pending item from a validated line spec.
    pub fn new(spec: &SaleLineSpec) -> Self {
        SaleItemDraft {
            stock_id: spec.stock_id.clone(),
            quantity: spec.quantity,
            price_kobo: spec.price_kobo,
        }
    }

    /// The stock entry this draft will deduct from.
    pub fn stock_id(&self) -> &str {
        &self.stock_id
    }

    /// Units this draft will deduct.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Commits the draft, consuming it. Called after the stock deduction
    /// for this line has succeeded inside the sale transaction.
    pub fn commit(
        self,
        id: String,
        sale_id: String,
        name_snapshot: String,
        at: DateTime<Utc>,
    ) -> SaleItem {
        SaleItem {
            id,
            sale_id,
            stock_id: self.stock_id,
            name_snapshot,
            quantity_sold: self.quantity,
            price_at_sale_kobo: self.price_kobo,
            created_at: at,
        }
    }
}

/// One stock item sold within a sale, at a snapshot price.
/// Immutable after creation: no quantity edits once sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub stock_id: String,
    /// Stock name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity_sold: i64,
    /// Unit price at time of sale (frozen).
    pub price_at_sale_kobo: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn price_at_sale(&self) -> Money {
        Money::from_kobo(self.price_at_sale_kobo)
    }

    /// Line total (snapshot price × quantity sold).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_sale().multiply_quantity(self.quantity_sold)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_scope_for_user() {
        assert_eq!(
            BranchScope::for_user(AccessLevel::Admin, "b1"),
            BranchScope::All
        );
        assert_eq!(
            BranchScope::for_user(AccessLevel::Manager, "b1"),
            BranchScope::All
        );
        assert_eq!(
            BranchScope::for_user(AccessLevel::Workshop, "b1"),
            BranchScope::Branch("b1".to_string())
        );
    }

    #[test]
    fn test_branch_scope_allows() {
        let scope = BranchScope::Branch("b1".to_string());
        assert!(scope.allows("b1"));
        assert!(!scope.allows("b2"));
        assert!(BranchScope::All.allows("b2"));
    }

    #[test]
    fn test_part_line_total() {
        let part = EstimatePart {
            id: "p1".to_string(),
            estimate_id: "e1".to_string(),
            name: "Brake pad".to_string(),
            price_kobo: 10_000,
            quantity: 2,
            created_at: Utc::now(),
        };
        assert_eq!(part.line_total().kobo(), 20_000);
    }

    #[test]
    fn test_draft_commit_freezes_fields() {
        let spec = SaleLineSpec {
            stock_id: "s1".to_string(),
            quantity: 3,
            price_kobo: 5000,
        };
        let now = Utc::now();
        let item = SaleItemDraft::new(&spec).commit(
            "i1".to_string(),
            "sale1".to_string(),
            "Engine Oil 5W30".to_string(),
            now,
        );
        assert_eq!(item.stock_id, "s1");
        assert_eq!(item.quantity_sold, 3);
        assert_eq!(item.line_total().kobo(), 15_000);
        assert_eq!(item.name_snapshot, "Engine Oil 5W30");
    }
}
