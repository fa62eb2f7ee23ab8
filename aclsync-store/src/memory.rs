//! In-memory access-fact cache.
//!
//! Backs engine tests and one-shot runs where durability is not needed.
//! Keeps the same secondary indexes the SQLite store maintains so lookup
//! behavior matches across implementations.

use crate::AccessStore;
use aclsync_core::{AccessFact, ResourceId, StoreError, UserId};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Inner {
    facts: HashSet<AccessFact>,
    /// Existence index for `has_access`: (resource, grantee) pairs.
    by_resource_grantee: HashSet<(ResourceId, UserId)>,
    /// Ownership index derived from self-facts only.
    owned: BTreeMap<UserId, BTreeSet<ResourceId>>,
}

/// In-memory implementation of [`AccessStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored facts.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.facts.clear();
        inner.by_resource_grantee.clear();
        inner.owned.clear();
        Ok(())
    }
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn has_access(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.by_resource_grantee.contains(&(resource_id, grantee_id)))
    }

    async fn resources_owned_by(
        &self,
        owner_id: UserId,
    ) -> Result<BTreeSet<ResourceId>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.owned.get(&owner_id).cloned().unwrap_or_default())
    }

    async fn record_grant(&self, fact: &AccessFact) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if !inner.facts.insert(*fact) {
            return Ok(false);
        }
        inner
            .by_resource_grantee
            .insert((fact.resource_id, fact.grantee_id));
        if fact.is_self_fact() {
            inner
                .owned
                .entry(fact.owner_id)
                .or_default()
                .insert(fact.resource_id);
        }
        Ok(true)
    }

    async fn fact_count(&self) -> Result<u64, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.facts.len() as u64)
    }
}

// =============================================================================
// TESTS
// =============================================================================
