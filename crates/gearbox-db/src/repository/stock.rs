//! # Stock Repository (Stock Deduction Engine)
//!
//! The deduction path is a single conditional UPDATE:
//!
//! ```sql
//! UPDATE stock_entries SET quantity = quantity - ?2
//! WHERE id = ?1 AND quantity >= ?2
//! ```
//!
//! The availability check and the decrement are one statement, so two
//! concurrent deductions on the same entry cannot both pass a stale check
//! and drive the quantity negative. Zero rows affected means the guard
//! failed; a follow-up read distinguishes a missing entry from an
//! insufficient one. The failed row is left exactly as it was.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, StockError};
use gearbox_core::{
    validation::{validate_price_kobo, validate_restock_amount, validate_sale_quantity,
        validate_stock_name},
    BranchScope, StockEntry,
};

/// Fields for a new stock entry.
#[derive(Debug, Clone)]
pub struct NewStockEntry {
    pub branch_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_value_kobo: i64,
}

/// Repository for branch-scoped stock entries.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

pub(crate) const STOCK_COLUMNS: &str =
    "id, branch_id, name, quantity, unit_value_kobo, created_at, updated_at";

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Creates a stock entry. Names are unique within a branch only; the
    /// same part name may exist at every branch with independent counts.
    pub async fn insert(&self, new: NewStockEntry) -> Result<StockEntry, StockError> {
        validate_stock_name(&new.name)?;
        validate_price_kobo(new.unit_value_kobo)?;
        if new.quantity < 0 {
            return Err(StockError::Invalid(
                gearbox_core::ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 0,
                    max: i64::MAX,
                },
            ));
        }

        let now = Utc::now();
        let entry = StockEntry {
            id: Uuid::new_v4().to_string(),
            branch_id: new.branch_id,
            name: new.name.trim().to_string(),
            quantity: new.quantity,
            unit_value_kobo: new.unit_value_kobo,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %entry.id, name = %entry.name, branch_id = %entry.branch_id, "Creating stock entry");

        sqlx::query(
            "INSERT INTO stock_entries (id, branch_id, name, quantity, unit_value_kobo, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&entry.id)
        .bind(&entry.branch_id)
        .bind(&entry.name)
        .bind(entry.quantity)
        .bind(entry.unit_value_kobo)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(entry)
    }

    /// Gets a stock entry by ID.
    ///
    /// A negative stored quantity is reported as a consistency failure
    /// rather than returned as data. The schema CHECK makes it unreachable
    /// through this crate; a hand-edited database should fail loudly, not
    /// flow onward as a sellable count.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockEntry>> {
        let entry = sqlx::query_as::<_, StockEntry>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock_entries WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref e) = entry {
            if e.quantity < 0 {
                return Err(DbError::Consistency(format!(
                    "stock entry {} has negative quantity {}",
                    e.id, e.quantity
                )));
            }
        }

        Ok(entry)
    }

    /// Looks up a stock entry by name within one branch.
    pub async fn get_in_branch(&self, branch_id: &str, name: &str) -> DbResult<Option<StockEntry>> {
        let entry = sqlx::query_as::<_, StockEntry>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock_entries WHERE branch_id = ?1 AND name = ?2"
        ))
        .bind(branch_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Lists stock entries visible to the given scope, alphabetical within
    /// branch.
    pub async fn list(&self, scope: &BranchScope) -> DbResult<Vec<StockEntry>> {
        let entries = match scope {
            BranchScope::All => {
                sqlx::query_as::<_, StockEntry>(&format!(
                    "SELECT {STOCK_COLUMNS} FROM stock_entries ORDER BY branch_id, name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            BranchScope::Branch(branch_id) => {
                sqlx::query_as::<_, StockEntry>(&format!(
                    "SELECT {STOCK_COLUMNS} FROM stock_entries WHERE branch_id = ?1 ORDER BY name"
                ))
                .bind(branch_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entries)
    }

    /// Adds units to a stock entry. The amount must be ≥ 1; corrections go
    /// through an explicit adjustment, not a negative restock.
    pub async fn restock(&self, id: &str, amount: i64) -> Result<StockEntry, StockError> {
        validate_restock_amount(amount)?;

        debug!(id = %id, amount = amount, "Restocking");

        let result = sqlx::query(
            "UPDATE stock_entries SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(StockError::NotFound(id.to_string()));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| StockError::NotFound(id.to_string()))
    }

    /// Atomically deducts `amount` units from a stock entry.
    ///
    /// On insufficient stock the entry is untouched and the error reports
    /// both the available and requested amounts.
    pub async fn deduct(&self, id: &str, amount: i64) -> Result<StockEntry, StockError> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        deduct_on(&mut *conn, id, amount).await?;
        drop(conn);

        self.get_by_id(id)
            .await?
            .ok_or_else(|| StockError::NotFound(id.to_string()))
    }
}

/// Deduction on a borrowed connection, so the sale coordinator can run it
/// inside its transaction and plain [`StockRepository::deduct`] can run it
/// against the pool.
pub(crate) async fn deduct_on(
    conn: &mut SqliteConnection,
    id: &str,
    amount: i64,
) -> Result<(), StockError> {
    validate_sale_quantity(amount)?;

    let result = sqlx::query(
        "UPDATE stock_entries SET quantity = quantity - ?2, updated_at = ?3 \
         WHERE id = ?1 AND quantity >= ?2",
    )
    .bind(id)
    .bind(amount)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(DbError::from)?;

    if result.rows_affected() > 0 {
        debug!(id = %id, amount = amount, "Deducted stock");
        return Ok(());
    }

    // Guard failed: re-read on the same connection to tell which way.
    let entry = sqlx::query_as::<_, StockEntry>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stock_entries WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(DbError::from)?;

    match entry {
        Some(e) => Err(StockError::Insufficient {
            id: e.id,
            name: e.name,
            available: e.quantity,
            requested: amount,
        }),
        None => Err(StockError::NotFound(id.to_string())),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_entry(db: &Database, name: &str, quantity: i64) -> StockEntry {
        let branch = db.branches().insert("ILORIN").await.unwrap();
        db.stock()
            .insert(NewStockEntry {
                branch_id: branch.id,
                name: name.to_string(),
                quantity,
                unit_value_kobo: 50_000,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_deduct_success_decrements() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Engine Oil 5W30", 10).await;

        let after = db.stock().deduct(&entry.id, 3).await.unwrap();
        assert_eq!(after.quantity, 7);
    }

    #[tokio::test]
    async fn test_insufficient_deduct_leaves_row_unchanged() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Brake Pad", 2).await;

        let err = db.stock().deduct(&entry.id, 5).await.unwrap_err();
        match err {
            StockError::Insufficient {
                available,
                requested,
                ref name,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
                assert_eq!(name, "Brake Pad");
            }
            other => panic!("expected Insufficient, got {other:?}"),
        }

        let unchanged = db.stock().get_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 2);
    }

    #[tokio::test]
    async fn test_deducts_never_drive_quantity_negative() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Oil Filter", 5).await;

        // Repeated deducts of 2: only as many succeed as the stock covers.
        let mut deducted = 0;
        for _ in 0..5 {
            if db.stock().deduct(&entry.id, 2).await.is_ok() {
                deducted += 2;
            }
        }

        let entry = db.stock().get_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(deducted, 4);
        assert_eq!(entry.quantity, 1);
        assert!(entry.quantity >= 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deducts_never_oversell() {
        // The in-memory config is single-connection, which serializes
        // everything; racing the guard needs a file-backed pool.
        let path = std::env::temp_dir().join(format!("gearbox-stock-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();

        let branch = db.branches().insert("ILORIN").await.unwrap();
        let entry = db
            .stock()
            .insert(NewStockEntry {
                branch_id: branch.id,
                name: "Brake Pad".to_string(),
                quantity: 10,
                unit_value_kobo: 10_000,
            })
            .await
            .unwrap();

        // 20 callers race to deduct 1 unit each from a stock of 10.
        let mut handles = Vec::new();
        for _ in 0..20 {
            let stock = db.stock();
            let id = entry.id.clone();
            handles.push(tokio::spawn(async move { stock.deduct(&id, 1).await.is_ok() }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        // Exactly the available units were sold; the rest saw Insufficient.
        let final_entry = db.stock().get_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(succeeded, 10);
        assert_eq!(final_entry.quantity, 0);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_deduct_exact_remaining_reaches_zero() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Fan Belt", 4).await;

        let after = db.stock().deduct(&entry.id, 4).await.unwrap();
        assert_eq!(after.quantity, 0);

        // And the next unit is refused.
        assert!(matches!(
            db.stock().deduct(&entry.id, 1).await,
            Err(StockError::Insufficient { available: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_deduct_rejects_non_positive_amounts() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Wiper Blade", 10).await;

        assert!(matches!(
            db.stock().deduct(&entry.id, 0).await,
            Err(StockError::Invalid(_))
        ));
        assert!(matches!(
            db.stock().deduct(&entry.id, -3).await,
            Err(StockError::Invalid(_))
        ));

        let unchanged = db.stock().get_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 10);
    }

    #[tokio::test]
    async fn test_deduct_missing_entry() {
        let db = test_db().await;
        seed_entry(&db, "Radiator Cap", 1).await;

        let err = db.stock().deduct("no-such-id", 1).await.unwrap_err();
        assert!(matches!(err, StockError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_restock_adds_units() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Clutch Plate", 3).await;

        let after = db.stock().restock(&entry.id, 7).await.unwrap();
        assert_eq!(after.quantity, 10);

        assert!(matches!(
            db.stock().restock(&entry.id, 0).await,
            Err(StockError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_same_name_across_branches() {
        let db = test_db().await;
        let alaka = db.branches().insert("ALAKA").await.unwrap();
        let ilorin = db.branches().insert("ILORIN").await.unwrap();

        for branch in [&alaka, &ilorin] {
            db.stock()
                .insert(NewStockEntry {
                    branch_id: branch.id.clone(),
                    name: "Engine Oil 5W30".to_string(),
                    quantity: 5,
                    unit_value_kobo: 50_000,
                })
                .await
                .unwrap();
        }

        let scoped = db
            .stock()
            .list(&BranchScope::Branch(alaka.id.clone()))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].branch_id, alaka.id);

        let all = db.stock().list(&BranchScope::All).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_within_branch_rejected() {
        let db = test_db().await;
        let entry = seed_entry(&db, "Brake Pad", 5).await;

        let err = db
            .stock()
            .insert(NewStockEntry {
                branch_id: entry.branch_id,
                name: "Brake Pad".to_string(),
                quantity: 1,
                unit_value_kobo: 10_000,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Db(DbError::UniqueViolation { .. })));
    }
}
