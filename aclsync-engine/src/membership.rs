//! Group membership lookup.

use aclsync_client::QueryService;
use aclsync_core::{FetchError, GroupId, UserId};
use std::collections::HashSet;
use std::sync::Arc;

/// Fetches the current member list of a group.
///
/// Stateless and uncached: membership is re-fetched every run, because a
/// stale snapshot would silently under-propagate access. One remote call per
/// lookup; group size is assumed small relative to the resource count.
pub struct MembershipResolver {
    service: Arc<dyn QueryService>,
}

impl MembershipResolver {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self { service }
    }

    /// Members of `group_id` in first-occurrence order, duplicates dropped.
    /// The order drives deterministic pair iteration downstream.
    pub async fn members(&self, group_id: GroupId) -> Result<Vec<UserId>, FetchError> {
        let raw = self.service.group_members(group_id).await?;
        let mut seen = HashSet::new();
        let members: Vec<UserId> = raw.into_iter().filter(|id| seen.insert(*id)).collect();
        tracing::debug!(group = %group_id, members = members.len(), "membership resolved");
        Ok(members)
    }
}
