//! SQLite-backed access-fact cache.
//!
//! One table of `(resource_id, owner_id, grantee_id)` triples with the full
//! triple as primary key. `INSERT OR IGNORE` carries the insert-if-absent
//! contract; secondary indexes keep the per-pair existence check and the
//! ownership lookup cheap as the catalog grows.

use crate::AccessStore;
use aclsync_core::{AccessFact, ResourceId, StoreError, UserId};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const CREATE_FACTS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS access_facts (
    resource_id INTEGER NOT NULL,
    owner_id    INTEGER NOT NULL,
    grantee_id  INTEGER NOT NULL,
    PRIMARY KEY (resource_id, owner_id, grantee_id)
)";

const CREATE_GRANTEE_INDEX: &str = "\
CREATE INDEX IF NOT EXISTS idx_access_facts_resource_grantee
    ON access_facts (resource_id, grantee_id)";

const CREATE_OWNER_INDEX: &str = "\
CREATE INDEX IF NOT EXISTS idx_access_facts_owner_self
    ON access_facts (owner_id) WHERE grantee_id = owner_id";

/// SQLite implementation of [`AccessStore`].
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) the cache database at `path` and run migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| StoreError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors if two runs overlap.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers at insert granularity.
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| StoreError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "opened access cache");
        Ok(store)
    }

    /// Open a transient in-memory cache. Facts do not survive the process.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StoreError::Open {
                path: ":memory:".to_string(),
                reason: e.to_string(),
            }
        })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            // Each connection to :memory: is a fresh database, so the one
            // connection must never be reaped.
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| StoreError::Open {
                path: ":memory:".to_string(),
                reason: e.to_string(),
            })?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in [CREATE_FACTS_TABLE, CREATE_GRANTEE_INDEX, CREATE_OWNER_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Migration {
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl AccessStore for SqliteStore {
    async fn has_access(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM access_facts WHERE resource_id = ? AND grantee_id = ?)",
        )
        .bind(resource_id.as_i64())
        .bind(grantee_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Query {
            reason: e.to_string(),
        })?;
        Ok(exists)
    }

    async fn resources_owned_by(
        &self,
        owner_id: UserId,
    ) -> Result<BTreeSet<ResourceId>, StoreError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT resource_id FROM access_facts WHERE owner_id = ? AND grantee_id = owner_id",
        )
        .bind(owner_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query {
            reason: e.to_string(),
        })?;
        Ok(rows.into_iter().map(|(id,)| ResourceId(id)).collect())
    }

    async fn record_grant(&self, fact: &AccessFact) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO access_facts (resource_id, owner_id, grantee_id) VALUES (?, ?, ?)",
        )
        .bind(fact.resource_id.as_i64())
        .bind(fact.owner_id.as_i64())
        .bind(fact.grantee_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Insert {
            reason: e.to_string(),
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn fact_count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_facts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query {
                reason: e.to_string(),
            })?;
        Ok(count as u64)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(resource: i64, owner: i64, grantee: i64) -> AccessFact {
        AccessFact::new(ResourceId(resource), UserId(owner), UserId(grantee))
    }

    #[tokio::test]
    async fn test_record_grant_insert_if_absent() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let f = fact(1, 7, 9);

        assert!(store.record_grant(&f).await.unwrap());
        assert!(!store.record_grant(&f).await.unwrap());
        assert_eq!(store.fact_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_has_access_matches_any_owner() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.record_grant(&fact(1, 7, 9)).await.unwrap();

        assert!(store.has_access(ResourceId(1), UserId(9)).await.unwrap());
        assert!(!store.has_access(ResourceId(1), UserId(7)).await.unwrap());
        assert!(!store.has_access(ResourceId(2), UserId(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_ownership_index_uses_self_facts_only() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.record_grant(&fact(1, 7, 7)).await.unwrap();
        store.record_grant(&fact(2, 8, 8)).await.unwrap();
        store.record_grant(&fact(1, 7, 8)).await.unwrap();

        assert_eq!(
            store.resources_owned_by(UserId(7)).await.unwrap(),
            BTreeSet::from([ResourceId(1)])
        );
        assert_eq!(
            store.resources_owned_by(UserId(8)).await.unwrap(),
            BTreeSet::from([ResourceId(2)])
        );
    }

    #[tokio::test]
    async fn test_facts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cache.db");

        {
            let store = SqliteStore::open(&db_path).await.unwrap();
            store.record_grant(&fact(1, 7, 7)).await.unwrap();
            store.record_grant(&fact(1, 7, 9)).await.unwrap();
        }

        let store = SqliteStore::open(&db_path).await.unwrap();
        assert_eq!(store.fact_count().await.unwrap(), 2);
        assert!(store.has_access(ResourceId(1), UserId(9)).await.unwrap());
        assert_eq!(
            store.resources_owned_by(UserId(7)).await.unwrap(),
            BTreeSet::from([ResourceId(1)])
        );
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("cache.db");

        let store = SqliteStore::open(&db_path).await.unwrap();
        store.record_grant(&fact(3, 2, 2)).await.unwrap();
        assert_eq!(store.fact_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
        assert_eq!(store.fact_count().await.unwrap(), 0);
    }
}
