//! Single-grant application.

use aclsync_client::QueryService;
use aclsync_core::{GrantError, ResourceId, UserId};
use std::sync::Arc;

/// Issues one remote modify-access mutation per call.
///
/// Never retries: the remote ACL change is a side effect outside this
/// system's control plane, so retry policy belongs to the caller. A rejected
/// or failed grant is simply re-attempted by a later reconciliation run once
/// the cache check sees the access is still missing.
pub struct GrantApplier {
    service: Arc<dyn QueryService>,
}

impl GrantApplier {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self { service }
    }

    /// Request modify access for `grantee_id` on `resource_id`.
    ///
    /// An embedded denial in a transport-successful response surfaces as
    /// [`GrantError::Rejected`]; everything else as [`GrantError::Transport`].
    pub async fn grant(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<(), GrantError> {
        self.service.grant_modify(resource_id, grantee_id).await
    }
}
