//! # Sale Repository (Sale Transaction Coordinator)
//!
//! Creates sales **all-or-nothing**. Every step runs inside one SQLite
//! transaction:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Sale Creation Flow                                    │
//! │                                                                         │
//! │  validate header + every line (no I/O)                                  │
//! │       │                                                                 │
//! │  derive total, reject overpayment (pure arithmetic)                     │
//! │       │                                                                 │
//! │  BEGIN ──► per line, submission order:                                  │
//! │       │      resolve stock in the sale's branch                         │
//! │       │      conditional deduction                                      │
//! │       │      draft → committed item                                     │
//! │       │    insert sale row + items                                      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  any failure ──► ROLLBACK: every deduction undone, no sale row,         │
//! │                  no items. Quantities read exactly as before the call.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deductions are not compensated line by line; the transaction itself is the
//! compensation. A failure on line N restores lines 0..N's stock by rollback,
//! so a multi-line sale can never half-apply.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult, SaleError, StockError};
use crate::repository::stock::{deduct_on, STOCK_COLUMNS};
use gearbox_core::{
    validation::{validate_customer_name, validate_payment_kobo, validate_price_kobo,
        validate_sale_quantity},
    BranchScope, Money, NewSale, SaleItem, SaleItemDraft, SaleLineSpec, SaleRecord, StockEntry,
};

/// Repository for sales and their line items.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

const SALE_COLUMNS: &str = "id, branch_id, customer_name, customer_contact, marketer, \
     amount_paid_kobo, credit_owed_kobo, total_kobo, created_at";

const ITEM_COLUMNS: &str =
    "id, sale_id, stock_id, name_snapshot, quantity_sold, price_at_sale_kobo, created_at";

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale with its items, deducting stock for every line.
    ///
    /// The sale's derived totals are computed here and nowhere else:
    /// `total = Σ line price × quantity`, `credit_owed = total - paid`.
    /// On any error the database is exactly as it was before the call.
    pub async fn create_sale(
        &self,
        new: NewSale,
        lines: &[SaleLineSpec],
    ) -> Result<SaleRecord, SaleError> {
        validate_customer_name(&new.customer_name)?;
        validate_payment_kobo(new.amount_paid_kobo)?;

        if lines.is_empty() {
            return Err(SaleError::EmptySale);
        }
        for (line, spec) in lines.iter().enumerate() {
            validate_sale_quantity(spec.quantity)
                .map_err(|source| SaleError::InvalidLine { line, source })?;
            validate_price_kobo(spec.price_kobo)
                .map_err(|source| SaleError::InvalidLine { line, source })?;
        }

        // The total is pure arithmetic over the agreed line prices, so the
        // overpayment ceiling is known before the transaction opens.
        let total = lines.iter().fold(Money::zero(), |acc, spec| {
            acc + Money::from_kobo(spec.price_kobo).multiply_quantity(spec.quantity)
        });
        let paid = Money::from_kobo(new.amount_paid_kobo);
        if paid > total {
            return Err(SaleError::Overpayment { paid, total });
        }

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut items = Vec::with_capacity(lines.len());
        for (line, spec) in lines.iter().enumerate() {
            let draft = SaleItemDraft::new(spec);

            // Resolve within the sale's branch only; an id from another
            // branch is indistinguishable from a missing one.
            let stock = sqlx::query_as::<_, StockEntry>(&format!(
                "SELECT {STOCK_COLUMNS} FROM stock_entries WHERE id = ?1 AND branch_id = ?2"
            ))
            .bind(draft.stock_id())
            .bind(&new.branch_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| SaleError::StockNotFound {
                line,
                stock_id: spec.stock_id.clone(),
                branch_id: new.branch_id.clone(),
            })?;

            deduct_on(&mut *tx, draft.stock_id(), draft.quantity())
                .await
                .map_err(|err| line_error(line, spec, &new.branch_id, err))?;

            items.push(draft.commit(Uuid::new_v4().to_string(), sale_id.clone(), stock.name, now));
        }

        let credit_owed = total - paid;
        let record = SaleRecord {
            id: sale_id,
            branch_id: new.branch_id,
            customer_name: new.customer_name.trim().to_string(),
            customer_contact: new.customer_contact,
            marketer: new.marketer,
            amount_paid_kobo: paid.kobo(),
            credit_owed_kobo: credit_owed.kobo(),
            total_kobo: total.kobo(),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO sales_records (id, branch_id, customer_name, customer_contact, \
             marketer, amount_paid_kobo, credit_owed_kobo, total_kobo, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&record.id)
        .bind(&record.branch_id)
        .bind(&record.customer_name)
        .bind(&record.customer_contact)
        .bind(&record.marketer)
        .bind(record.amount_paid_kobo)
        .bind(record.credit_owed_kobo)
        .bind(record.total_kobo)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for item in &items {
            sqlx::query(
                "INSERT INTO sale_items (id, sale_id, stock_id, name_snapshot, quantity_sold, \
                 price_at_sale_kobo, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.stock_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity_sold)
            .bind(item.price_at_sale_kobo)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %record.id,
            items = items.len(),
            total = %record.total(),
            credit = %record.credit_owed(),
            "Sale created"
        );

        Ok(record)
    }

    /// Updates a sale's payment and re-derives the credit owed in the same
    /// statement.
    ///
    /// The guard `total_kobo >= ?2` keeps the update and the overpayment
    /// check atomic: a rejected payment leaves both previous values intact.
    pub async fn update_payment(
        &self,
        sale_id: &str,
        amount_paid_kobo: i64,
    ) -> Result<SaleRecord, SaleError> {
        validate_payment_kobo(amount_paid_kobo)?;

        let result = sqlx::query(
            "UPDATE sales_records SET amount_paid_kobo = ?2, \
             credit_owed_kobo = total_kobo - ?2 \
             WHERE id = ?1 AND total_kobo >= ?2",
        )
        .bind(sale_id)
        .bind(amount_paid_kobo)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            // Guard failed: either the sale is missing or the payment
            // exceeds its total.
            return match self.get_by_id(sale_id).await? {
                Some(sale) => Err(SaleError::Overpayment {
                    paid: Money::from_kobo(amount_paid_kobo),
                    total: sale.total(),
                }),
                None => Err(SaleError::SaleNotFound(sale_id.to_string())),
            };
        }

        debug!(sale_id = %sale_id, paid_kobo = amount_paid_kobo, "Payment updated");

        self.get_by_id(sale_id)
            .await?
            .ok_or_else(|| SaleError::SaleNotFound(sale_id.to_string()))
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, sale_id: &str) -> DbResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, SaleRecord>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales_records WHERE id = ?1"
        ))
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale's items in submission order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales visible to the given scope, newest first.
    pub async fn list(&self, scope: &BranchScope) -> DbResult<Vec<SaleRecord>> {
        let sales = match scope {
            BranchScope::All => {
                sqlx::query_as::<_, SaleRecord>(&format!(
                    "SELECT {SALE_COLUMNS} FROM sales_records ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            BranchScope::Branch(branch_id) => {
                sqlx::query_as::<_, SaleRecord>(&format!(
                    "SELECT {SALE_COLUMNS} FROM sales_records \
                     WHERE branch_id = ?1 ORDER BY created_at DESC"
                ))
                .bind(branch_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(sales)
    }
}

/// Attaches the failing line's index to a deduction failure.
fn line_error(line: usize, spec: &SaleLineSpec, branch_id: &str, err: StockError) -> SaleError {
    match err {
        StockError::Insufficient {
            id,
            name,
            available,
            requested,
        } => SaleError::InsufficientStock {
            line,
            stock_id: id,
            name,
            available,
            requested,
        },
        StockError::NotFound(_) => SaleError::StockNotFound {
            line,
            stock_id: spec.stock_id.clone(),
            branch_id: branch_id.to_string(),
        },
        StockError::Invalid(source) => SaleError::InvalidLine { line, source },
        StockError::Db(db) => SaleError::Db(db),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
