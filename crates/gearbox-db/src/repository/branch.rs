//! # Branch Repository
//!
//! The branch registry. Branches partition stock, estimates, and sales;
//! everything else joins against these rows.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use gearbox_core::Branch;

/// Repository for branch database operations.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    /// Creates a new BranchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BranchRepository { pool }
    }

    /// Registers a new branch. Branch names are unique; a duplicate surfaces
    /// as `DbError::UniqueViolation`.
    pub async fn insert(&self, name: &str) -> DbResult<Branch> {
        let branch = Branch {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %branch.id, name = %branch.name, "Registering branch");

        sqlx::query("INSERT INTO branches (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&branch.id)
            .bind(&branch.name)
            .bind(branch.created_at)
            .execute(&self.pool)
            .await?;

        Ok(branch)
    }

    /// Gets a branch by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT id, name, created_at FROM branches WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Gets a branch by its (unique) name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT id, name, created_at FROM branches WHERE name = ?1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Lists all branches, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT id, name, created_at FROM branches ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(branches)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
