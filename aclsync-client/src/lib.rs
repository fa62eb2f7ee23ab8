//! aclsync client - remote query-service access
//!
//! The [`QueryService`] trait is the seam between reconciliation and the
//! remote service: four read/write operations covering the status summary,
//! the paginated catalog listing, group membership, and the single-resource
//! ACL grant. [`RestClient`] implements it over HTTP; tests substitute fakes.

pub mod rest;
pub mod types;

pub use rest::RestClient;
pub use types::{
    embedded_message, AclGrantRequest, MemberEntry, OwnerRef, ResourcePage, ResourceSummary,
    ServiceStatus,
};

use aclsync_core::{FetchError, GrantError, GroupId, Resource, ResourceId, UserId};
use async_trait::async_trait;

/// Remote query-service operations used by reconciliation.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Service summary, including the total stored-query count.
    async fn status(&self) -> Result<ServiceStatus, FetchError>;

    /// One page of the query catalog. Pages are 1-based and fixed-size;
    /// the last page may be short or empty.
    async fn resource_page(&self, page: u32, page_size: u32)
        -> Result<Vec<Resource>, FetchError>;

    /// Current members of `group_id`, in the order the service returns them.
    async fn group_members(&self, group_id: GroupId) -> Result<Vec<UserId>, FetchError>;

    /// Grant `grantee_id` modify access to `resource_id`.
    ///
    /// Exactly one remote mutation per call, never retried here: the remote
    /// ACL change is a side effect outside this system's control, so retry
    /// policy belongs to the caller.
    async fn grant_modify(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<(), GrantError>;
}
