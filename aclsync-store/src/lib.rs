//! aclsync store - durable access-fact cache
//!
//! Defines the cache abstraction the reconciliation engine runs against,
//! plus two implementations: a SQLite-backed store for real runs and an
//! in-memory store for tests.
//!
//! The cache holds append-only `(resource_id, owner_id, grantee_id)` facts.
//! The triple is the uniqueness key; inserting an existing triple is a no-op,
//! never an error. Facts are never mutated or deleted.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use aclsync_core::{AccessFact, ResourceId, StoreError, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Access-fact cache contract.
///
/// Every operation is idempotent: calling it repeatedly with identical
/// arguments observes and produces the same cache state.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// True iff any fact exists for this resource and grantee, regardless
    /// of which owner recorded it.
    async fn has_access(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<bool, StoreError>;

    /// Resources owned by `owner_id`, derived from self-facts only
    /// (`grantee_id == owner_id`). Facts granted to others never contribute
    /// to ownership.
    async fn resources_owned_by(&self, owner_id: UserId)
        -> Result<BTreeSet<ResourceId>, StoreError>;

    /// Insert the fact if absent. Returns `true` when the fact was newly
    /// inserted and `false` when the exact triple already existed.
    async fn record_grant(&self, fact: &AccessFact) -> Result<bool, StoreError>;

    /// Total number of stored facts.
    async fn fact_count(&self) -> Result<u64, StoreError>;
}
