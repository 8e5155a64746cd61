//! # Estimate Repository (Recalculation Engine)
//!
//! Keeps an estimate's derived VAT/total columns consistent with its parts.
//!
//! ## Explicit Call Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Recalculation Flow                                    │
//! │                                                                         │
//! │  add_part ──┐                                                           │
//! │  update_part ├──► mutate row ──► recalculate(estimate_id)               │
//! │  delete_part ┘                        │                                 │
//! │  set_apply_vat ───────────────────────┤                                 │
//! │                                       ▼                                 │
//! │                load parts ──► compute_totals (gearbox-core)             │
//! │                                       │                                 │
//! │                         changed? ──no──► done (no write)                │
//! │                            │yes                                         │
//! │                            ▼                                            │
//! │              UPDATE only vat_kobo + total_with_vat_kobo                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation path calls [`EstimateRepository::recalculate`] directly as
//! its last step. There is no hook registry to disconnect and reconnect, so
//! the write path cannot re-trigger itself: the write touches only the two
//! derived columns, and nothing listens for writes.
//!
//! The write-only-if-changed rule makes recalculation idempotent and safe to
//! retry, including under concurrent callers racing on the same estimate.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, EstimateError};
use gearbox_core::{
    compute_totals,
    validation::{validate_part_name, validate_part_quantity, validate_price_kobo},
    Estimate, EstimatePart, EstimateTotals,
};

/// Fields for a new estimate. Derived totals are not accepted; a fresh
/// estimate has zero parts and therefore zero totals.
#[derive(Debug, Clone)]
pub struct NewEstimate {
    pub vehicle_id: String,
    pub branch_id: String,
    pub apply_vat: bool,
}

/// Fields for a new or updated part.
#[derive(Debug, Clone)]
pub struct PartFields {
    pub name: String,
    pub price_kobo: i64,
    pub quantity: i64,
}

impl PartFields {
    fn validate(&self) -> Result<(), EstimateError> {
        validate_part_name(&self.name)?;
        validate_price_kobo(self.price_kobo)?;
        validate_part_quantity(self.quantity)?;
        Ok(())
    }
}

/// Repository for estimates and their parts.
#[derive(Debug, Clone)]
pub struct EstimateRepository {
    pool: SqlitePool,
}

const ESTIMATE_COLUMNS: &str = "id, vehicle_id, branch_id, apply_vat, vat_kobo, \
     total_with_vat_kobo, is_finalized, created_at, updated_at";

const PART_COLUMNS: &str = "id, estimate_id, name, price_kobo, quantity, created_at";

impl EstimateRepository {
    /// Creates a new EstimateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EstimateRepository { pool }
    }

    /// Creates an estimate for a vehicle job. Created together with its
    /// subject; totals start at zero (the zero-part edge case).
    pub async fn create(&self, new: NewEstimate) -> Result<Estimate, EstimateError> {
        let now = Utc::now();
        let estimate = Estimate {
            id: Uuid::new_v4().to_string(),
            vehicle_id: new.vehicle_id,
            branch_id: new.branch_id,
            apply_vat: new.apply_vat,
            vat_kobo: 0,
            total_with_vat_kobo: 0,
            is_finalized: false,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %estimate.id, vehicle_id = %estimate.vehicle_id, "Creating estimate");

        sqlx::query(
            "INSERT INTO estimates (id, vehicle_id, branch_id, apply_vat, vat_kobo, \
             total_with_vat_kobo, is_finalized, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&estimate.id)
        .bind(&estimate.vehicle_id)
        .bind(&estimate.branch_id)
        .bind(estimate.apply_vat)
        .bind(estimate.vat_kobo)
        .bind(estimate.total_with_vat_kobo)
        .bind(estimate.is_finalized)
        .bind(estimate.created_at)
        .bind(estimate.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(estimate)
    }

    /// Gets an estimate by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Estimate>> {
        let estimate = sqlx::query_as::<_, Estimate>(&format!(
            "SELECT {ESTIMATE_COLUMNS} FROM estimates WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(estimate)
    }

    /// Gets all parts of an estimate, in insertion order.
    pub async fn get_parts(&self, estimate_id: &str) -> DbResult<Vec<EstimatePart>> {
        let parts = sqlx::query_as::<_, EstimatePart>(&format!(
            "SELECT {PART_COLUMNS} FROM estimate_parts \
             WHERE estimate_id = ?1 ORDER BY created_at, id"
        ))
        .bind(estimate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(parts)
    }

    /// Adds a part to an estimate, then recalculates the estimate's derived
    /// totals as the explicit last step.
    pub async fn add_part(
        &self,
        estimate_id: &str,
        fields: PartFields,
    ) -> Result<EstimatePart, EstimateError> {
        fields.validate()?;
        self.require_editable(estimate_id).await?;

        let part = EstimatePart {
            id: Uuid::new_v4().to_string(),
            estimate_id: estimate_id.to_string(),
            name: fields.name.trim().to_string(),
            price_kobo: fields.price_kobo,
            quantity: fields.quantity,
            created_at: Utc::now(),
        };

        debug!(estimate_id = %estimate_id, part = %part.name, "Adding estimate part");

        sqlx::query(
            "INSERT INTO estimate_parts (id, estimate_id, name, price_kobo, quantity, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&part.id)
        .bind(&part.estimate_id)
        .bind(&part.name)
        .bind(part.price_kobo)
        .bind(part.quantity)
        .bind(part.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.recalculate(estimate_id).await?;
        Ok(part)
    }

    /// Updates a part in place, then recalculates the owning estimate.
    pub async fn update_part(
        &self,
        part_id: &str,
        fields: PartFields,
    ) -> Result<EstimatePart, EstimateError> {
        fields.validate()?;

        let existing = self
            .get_part(part_id)
            .await?
            .ok_or_else(|| EstimateError::PartNotFound(part_id.to_string()))?;
        self.require_editable(&existing.estimate_id).await?;

        debug!(part_id = %part_id, "Updating estimate part");

        sqlx::query(
            "UPDATE estimate_parts SET name = ?2, price_kobo = ?3, quantity = ?4 WHERE id = ?1",
        )
        .bind(part_id)
        .bind(fields.name.trim())
        .bind(fields.price_kobo)
        .bind(fields.quantity)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.recalculate(&existing.estimate_id).await?;

        Ok(EstimatePart {
            name: fields.name.trim().to_string(),
            price_kobo: fields.price_kobo,
            quantity: fields.quantity,
            ..existing
        })
    }

    /// Deletes a part, then recalculates the owning estimate.
    pub async fn delete_part(&self, part_id: &str) -> Result<(), EstimateError> {
        let existing = self
            .get_part(part_id)
            .await?
            .ok_or_else(|| EstimateError::PartNotFound(part_id.to_string()))?;
        self.require_editable(&existing.estimate_id).await?;

        debug!(part_id = %part_id, estimate_id = %existing.estimate_id, "Deleting estimate part");

        sqlx::query("DELETE FROM estimate_parts WHERE id = ?1")
            .bind(part_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        self.recalculate(&existing.estimate_id).await?;
        Ok(())
    }

    /// Flips the VAT flag, then recalculates.
    pub async fn set_apply_vat(
        &self,
        estimate_id: &str,
        apply_vat: bool,
    ) -> Result<EstimateTotals, EstimateError> {
        self.require_editable(estimate_id).await?;

        sqlx::query("UPDATE estimates SET apply_vat = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(estimate_id)
            .bind(apply_vat)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        self.recalculate(estimate_id).await
    }

    /// Recomputes the derived totals from the parts and writes them back
    /// **only if changed**.
    ///
    /// The write touches only `vat_kobo` and `total_with_vat_kobo` (plus the
    /// audit timestamp); it cannot cascade into another recalculation
    /// because nothing observes writes. Calling this twice with no
    /// intervening mutation performs exactly one write, then zero.
    pub async fn recalculate(&self, estimate_id: &str) -> Result<EstimateTotals, EstimateError> {
        let estimate = self
            .get_by_id(estimate_id)
            .await?
            .ok_or_else(|| EstimateError::NotFound(estimate_id.to_string()))?;
        let parts = self.get_parts(estimate_id).await?;

        let totals = compute_totals(estimate.apply_vat, &parts)?;

        let unchanged = estimate.vat_kobo == totals.vat.kobo()
            && estimate.total_with_vat_kobo == totals.total.kobo();
        if unchanged {
            return Ok(totals);
        }

        debug!(
            estimate_id = %estimate_id,
            vat = %totals.vat,
            total = %totals.total,
            "Writing recalculated estimate totals"
        );

        sqlx::query(
            "UPDATE estimates SET vat_kobo = ?2, total_with_vat_kobo = ?3, updated_at = ?4 \
             WHERE id = ?1",
        )
        .bind(estimate_id)
        .bind(totals.vat.kobo())
        .bind(totals.total.kobo())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(totals)
    }

    /// Finalizes an estimate (converts it to an invoice): recalculates one
    /// last time, then freezes the parts.
    pub async fn finalize(&self, estimate_id: &str) -> Result<Estimate, EstimateError> {
        self.recalculate(estimate_id).await?;

        let result = sqlx::query(
            "UPDATE estimates SET is_finalized = 1, updated_at = ?2 \
             WHERE id = ?1 AND is_finalized = 0",
        )
        .bind(estimate_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(EstimateError::Finalized(estimate_id.to_string()));
        }

        self.get_by_id(estimate_id)
            .await?
            .ok_or_else(|| EstimateError::NotFound(estimate_id.to_string()))
    }

    /// Deletes an estimate; its parts go with it (cascade).
    pub async fn delete(&self, estimate_id: &str) -> DbResult<()> {
        debug!(estimate_id = %estimate_id, "Deleting estimate");

        let result = sqlx::query("DELETE FROM estimates WHERE id = ?1")
            .bind(estimate_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Estimate", estimate_id));
        }

        Ok(())
    }

    /// Gets a single part by ID.
    pub async fn get_part(&self, part_id: &str) -> DbResult<Option<EstimatePart>> {
        let part = sqlx::query_as::<_, EstimatePart>(&format!(
            "SELECT {PART_COLUMNS} FROM estimate_parts WHERE id = ?1"
        ))
        .bind(part_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(part)
    }

    /// Rejects mutations against missing or finalized estimates.
    async fn require_editable(&self, estimate_id: &str) -> Result<(), EstimateError> {
        let estimate = self
            .get_by_id(estimate_id)
            .await?
            .ok_or_else(|| EstimateError::NotFound(estimate_id.to_string()))?;

        if estimate.is_finalized {
            return Err(EstimateError::Finalized(estimate_id.to_string()));
        }

        Ok(())
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

    async fn test_estimate(db: &Database, apply_vat: bool) -> Estimate {
        let branch = db.branches().insert("ALAKA").await.unwrap();
        db.estimates()
            .create(NewEstimate {
                vehicle_id: "veh-1".to_string(),
                branch_id: branch.id,
                apply_vat,
            })
            .await
            .unwrap()
    }

    fn part(name: &str, price_kobo: i64, quantity: i64) -> PartFields {
        PartFields {
            name: name.to_string(),
            price_kobo,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_zero_parts_zero_totals() {
        let db = test_db().await;
        let estimate = test_estimate(&db, true).await;

        let totals = db.estimates().recalculate(&estimate.id).await.unwrap();
        assert_eq!(totals, EstimateTotals::zero());

        let stored = db
            .estimates()
            .get_by_id(&estimate.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.vat_kobo, 0);
        assert_eq!(stored.total_with_vat_kobo, 0);
    }

    #[tokio::test]
    async fn test_add_part_recalculates_vat() {
        let db = test_db().await;
        let estimate = test_estimate(&db, true).await;
        let repo = db.estimates();

        // [(₦100.00, qty 2), (₦50.00, qty 1)] ⇒ ₦250.00 / ₦18.75 / ₦268.75
        repo.add_part(&estimate.id, part("Brake Pad", 10_000, 2))
            .await
            .unwrap();
        repo.add_part(&estimate.id, part("Oil Filter", 5_000, 1))
            .await
            .unwrap();

        let stored = repo.get_by_id(&estimate.id).await.unwrap().unwrap();
        assert_eq!(stored.vat_kobo, 1_875);
        assert_eq!(stored.total_with_vat_kobo, 26_875);
    }

    #[tokio::test]
    async fn test_update_and_delete_part_recalculate() {
        let db = test_db().await;
        let estimate = test_estimate(&db, false).await;
        let repo = db.estimates();

        let p = repo
            .add_part(&estimate.id, part("Spark Plug", 2_000, 4))
            .await
            .unwrap();
        assert_eq!(
            repo.get_by_id(&estimate.id)
                .await
                .unwrap()
                .unwrap()
                .total_with_vat_kobo,
            8_000
        );

        repo.update_part(&p.id, part("Spark Plug", 2_000, 2))
            .await
            .unwrap();
        assert_eq!(
            repo.get_by_id(&estimate.id)
                .await
                .unwrap()
                .unwrap()
                .total_with_vat_kobo,
            4_000
        );

        repo.delete_part(&p.id).await.unwrap();
        assert_eq!(
            repo.get_by_id(&estimate.id)
                .await
                .unwrap()
                .unwrap()
                .total_with_vat_kobo,
            0
        );
    }

    #[tokio::test]
    async fn test_recalculate_is_idempotent_no_second_write() {
        let db = test_db().await;
        let estimate = test_estimate(&db, true).await;
        let repo = db.estimates();

        repo.add_part(&estimate.id, part("Brake Pad", 10_000, 2))
            .await
            .unwrap();

        let first = repo.recalculate(&estimate.id).await.unwrap();
        let after_first = repo.get_by_id(&estimate.id).await.unwrap().unwrap();

        let second = repo.recalculate(&estimate.id).await.unwrap();
        let after_second = repo.get_by_id(&estimate.id).await.unwrap().unwrap();

        assert_eq!(first, second);
        // Unchanged totals are not rewritten - the audit timestamp proves it.
        assert_eq!(after_first.updated_at, after_second.updated_at);
    }

    #[tokio::test]
    async fn test_set_apply_vat_recalculates() {
        let db = test_db().await;
        let estimate = test_estimate(&db, false).await;
        let repo = db.estimates();

        repo.add_part(&estimate.id, part("Brake Pad", 10_000, 2))
            .await
            .unwrap();
        assert_eq!(
            repo.get_by_id(&estimate.id).await.unwrap().unwrap().vat_kobo,
            0
        );

        let totals = repo.set_apply_vat(&estimate.id, true).await.unwrap();
        assert_eq!(totals.vat.kobo(), 1_500); // 7.5% of ₦200.00
        assert_eq!(totals.total.kobo(), 21_500);
    }

    #[tokio::test]
    async fn test_finalized_estimate_rejects_part_mutations() {
        let db = test_db().await;
        let estimate = test_estimate(&db, true).await;
        let repo = db.estimates();

        let p = repo
            .add_part(&estimate.id, part("Brake Pad", 10_000, 1))
            .await
            .unwrap();
        repo.finalize(&estimate.id).await.unwrap();

        let err = repo
            .add_part(&estimate.id, part("Oil Filter", 5_000, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EstimateError::Finalized(_)));

        let err = repo.delete_part(&p.id).await.unwrap_err();
        assert!(matches!(err, EstimateError::Finalized(_)));
    }

    #[tokio::test]
    async fn test_invalid_part_rejected_before_mutation() {
        let db = test_db().await;
        let estimate = test_estimate(&db, true).await;
        let repo = db.estimates();

        assert!(matches!(
            repo.add_part(&estimate.id, part("", 10_000, 1)).await,
            Err(EstimateError::Invalid(_))
        ));
        assert!(matches!(
            repo.add_part(&estimate.id, part("Brake Pad", -1, 1)).await,
            Err(EstimateError::Invalid(_))
        ));
        assert!(matches!(
            repo.add_part(&estimate.id, part("Brake Pad", 10_000, 0)).await,
            Err(EstimateError::Invalid(_))
        ));

        // Nothing was persisted.
        assert!(repo.get_parts(&estimate.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_estimate_cascades_parts() {
        let db = test_db().await;
        let estimate = test_estimate(&db, true).await;
        let repo = db.estimates();

        repo.add_part(&estimate.id, part("Brake Pad", 10_000, 1))
            .await
            .unwrap();
        repo.delete(&estimate.id).await.unwrap();

        assert!(repo.get_by_id(&estimate.id).await.unwrap().is_none());
        assert!(repo.get_parts(&estimate.id).await.unwrap().is_empty());
    }
}
