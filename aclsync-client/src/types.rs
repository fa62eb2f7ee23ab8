//! Wire types for the remote query-management service.
//!
//! Field names follow the remote JSON; Rust-side names describe the role the
//! field plays here. Responses carry many more fields than these; unknown
//! fields are ignored on purpose.

use aclsync_core::{Resource, ResourceId, UserId};
use serde::{Deserialize, Serialize};

/// Summary returned by the service status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    /// Total number of stored queries the service reports.
    #[serde(rename = "queries_count")]
    pub resource_count: u64,
}

/// One page of the paginated query listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourcePage {
    pub results: Vec<ResourceSummary>,
}

/// A single query as listed by the catalog, reduced to what reconciliation
/// needs: its id and its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResourceSummary {
    pub id: i64,
    #[serde(rename = "user")]
    pub owner: OwnerRef,
}

/// Owner reference embedded in a listed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OwnerRef {
    pub id: i64,
}

impl From<ResourceSummary> for Resource {
    fn from(summary: ResourceSummary) -> Self {
        Resource::new(ResourceId(summary.id), UserId(summary.owner.id))
    }
}

/// One member in a group membership response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemberEntry {
    pub id: i64,
}

impl From<MemberEntry> for UserId {
    fn from(entry: MemberEntry) -> Self {
        UserId(entry.id)
    }
}

/// Body of the ACL grant mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclGrantRequest {
    pub access_type: &'static str,
    pub user_id: i64,
}

impl AclGrantRequest {
    /// A modify-access grant for `grantee_id`. The service supports other
    /// access kinds; this system only ever requests modify.
    pub fn modify(grantee_id: UserId) -> Self {
        Self {
            access_type: "modify",
            user_id: grantee_id.as_i64(),
        }
    }
}

/// Extract the embedded denial message, if any.
///
/// The service reports some logical failures inside an HTTP-successful
/// response as `{"message": "..."}`; a non-empty message means the request
/// was denied regardless of the status code.
pub fn embedded_message(value: &serde_json::Value) -> Option<&str> {
    match value.get("message").and_then(|m| m.as_str()) {
        Some(msg) if !msg.is_empty() => Some(msg),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
