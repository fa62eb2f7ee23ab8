//! aclsync core - shared data types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types and the error taxonomy - no business
//! logic, no I/O.

pub mod error;

pub use error::{
    AclSyncError, AclSyncResult, ConfigError, EngineError, FetchError, GrantError, StoreError,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Identifier of a resource (a saved query) in the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub i64);

/// Identifier of a user account in the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Identifier of a user group in the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl ResourceId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl UserId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl GroupId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResourceId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<i64> for GroupId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

// ============================================================================
// ACCESS FACTS
// ============================================================================

/// A recorded access fact: `grantee_id` has modify access to `resource_id`,
/// which is owned by `owner_id`.
///
/// The full triple is the uniqueness key. Facts are append-only: created when
/// the catalog is refreshed (owner self-facts) or when a grant is applied
/// (grantee facts), never mutated, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessFact {
    pub resource_id: ResourceId,
    pub owner_id: UserId,
    pub grantee_id: UserId,
}

impl AccessFact {
    pub fn new(resource_id: ResourceId, owner_id: UserId, grantee_id: UserId) -> Self {
        Self {
            resource_id,
            owner_id,
            grantee_id,
        }
    }

    /// The owner's trivial access to their own resource. Every resource in
    /// the cache carries exactly one of these.
    pub fn self_fact(resource_id: ResourceId, owner_id: UserId) -> Self {
        Self {
            resource_id,
            owner_id,
            grantee_id: owner_id,
        }
    }

    /// True when this fact records the owner's own access.
    pub fn is_self_fact(&self) -> bool {
        self.owner_id == self.grantee_id
    }
}

impl fmt::Display for AccessFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resource {} owner {} grantee {}",
            self.resource_id, self.owner_id, self.grantee_id
        )
    }
}

/// A resource as listed by the remote catalog. Transient: only used to derive
/// the owner self-fact, never persisted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub owner_id: UserId,
}

impl Resource {
    pub fn new(id: ResourceId, owner_id: UserId) -> Self {
        Self { id, owner_id }
    }
}

// ============================================================================
// RUN OUTCOMES
// ============================================================================

/// Outcome of one catalog refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Pages requested from the remote listing.
    pub pages_fetched: u32,
    /// Resources seen across all fetched pages (duplicates included).
    pub resources_listed: u64,
    /// Owner self-facts newly inserted into the cache.
    pub new_facts: u64,
}

/// One grant that the remote service failed to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantFailure {
    pub fact: AccessFact,
    pub error: GrantError,
}

/// Structured report of one reconciliation run.
///
/// `attempted` counts remote grant calls; `granted` counts the ones that both
/// succeeded remotely and were recorded locally. `unrecorded` lists the
/// drift case: the remote grant succeeded but the local record failed, so the
/// cache understates remote state until the next run repairs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub group_id: GroupId,
    pub members: usize,
    pub refresh: RefreshStats,
    pub attempted: u64,
    pub granted: u64,
    pub already_present: u64,
    pub failures: Vec<GrantFailure>,
    pub unrecorded: Vec<AccessFact>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ReconcileSummary {
    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }

    /// True when the run needed no remote mutations and none failed: the
    /// group was already fully symmetric.
    pub fn is_converged(&self) -> bool {
        self.attempted == 0 && self.failures.is_empty() && self.unrecorded.is_empty()
    }
}

impl fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "group {}: {} members, {} grants attempted, {} granted, {} already present, {} failed",
            self.group_id,
            self.members,
            self.attempted,
            self.granted,
            self.already_present,
            self.failed()
        )?;
        writeln!(
            f,
            "  refresh: {} pages, {} resources listed, {} new facts",
            self.refresh.pages_fetched, self.refresh.resources_listed, self.refresh.new_facts
        )?;
        for failure in &self.failures {
            writeln!(f, "  failed: {}: {}", failure.fact, failure.error)?;
        }
        for fact in &self.unrecorded {
            writeln!(f, "  granted remotely but not recorded locally: {}", fact)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_fact_invariant() {
        let fact = AccessFact::self_fact(ResourceId(1), UserId(7));
        assert!(fact.is_self_fact());
        assert_eq!(fact.grantee_id, fact.owner_id);

        let granted = AccessFact::new(ResourceId(1), UserId(7), UserId(9));
        assert!(!granted.is_self_fact());
    }

    #[test]
    fn test_access_fact_display() {
        let fact = AccessFact::new(ResourceId(42), UserId(7), UserId(9));
        assert_eq!(format!("{}", fact), "resource 42 owner 7 grantee 9");
    }

    #[test]
    fn test_ids_serialize_transparent() {
        let id = ResourceId(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: ResourceId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_summary_display_lists_failures() {
        let fact = AccessFact::new(ResourceId(2), UserId(7), UserId(9));
        let summary = ReconcileSummary {
            group_id: GroupId(5),
            members: 3,
            refresh: RefreshStats {
                pages_fetched: 1,
                resources_listed: 3,
                new_facts: 3,
            },
            attempted: 6,
            granted: 5,
            already_present: 0,
            failures: vec![GrantFailure {
                fact,
                error: GrantError::Transport {
                    resource_id: fact.resource_id,
                    grantee_id: fact.grantee_id,
                    reason: "connection reset".to_string(),
                },
            }],
            unrecorded: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let rendered = format!("{}", summary);
        assert!(rendered.contains("6 grants attempted"));
        assert!(rendered.contains("1 failed"));
        assert!(rendered.contains("resource 2 owner 7 grantee 9"));
        assert!(!summary.is_converged());
    }

    #[test]
    fn test_converged_summary() {
        let summary = ReconcileSummary {
            group_id: GroupId(5),
            members: 2,
            refresh: RefreshStats::default(),
            attempted: 0,
            granted: 0,
            already_present: 4,
            failures: Vec::new(),
            unrecorded: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        assert!(summary.is_converged());
        assert_eq!(summary.failed(), 0);
    }
}
