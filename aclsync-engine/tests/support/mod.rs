//! Shared fakes for engine tests: a scripted remote service and a store
//! whose writes can be made to fail on chosen facts.

#![allow(dead_code)]

use aclsync_client::{QueryService, ServiceStatus};
use aclsync_core::{
    AccessFact, FetchError, GrantError, GroupId, Resource, ResourceId, StoreError, UserId,
};
use aclsync_store::{AccessStore, MemoryStore};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct FakeState {
    resources: Vec<Resource>,
    memberships: HashMap<GroupId, Vec<UserId>>,
    grant_calls: Vec<(ResourceId, UserId)>,
    failing_grants: HashSet<(ResourceId, UserId)>,
    status_down: bool,
    membership_down: bool,
    reported_total: Option<u64>,
    repeat_first_page: bool,
    pages_requested: Vec<u32>,
}

/// Scripted implementation of [`QueryService`].
///
/// Serves a fixed catalog and membership table, records every grant call,
/// and can be told to fail specific grants or whole endpoints.
#[derive(Debug, Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&self, resource: i64, owner: i64) {
        self.state
            .lock()
            .unwrap()
            .resources
            .push(Resource::new(ResourceId(resource), UserId(owner)));
    }

    pub fn set_members(&self, group: GroupId, members: &[i64]) {
        self.state
            .lock()
            .unwrap()
            .memberships
            .insert(group, members.iter().map(|&id| UserId(id)).collect());
    }

    /// Make the grant for (resource, grantee) fail with a transport error.
    pub fn fail_grant(&self, resource: i64, grantee: i64) {
        self.state
            .lock()
            .unwrap()
            .failing_grants
            .insert((ResourceId(resource), UserId(grantee)));
    }

    pub fn clear_grant_failures(&self) {
        self.state.lock().unwrap().failing_grants.clear();
    }

    pub fn set_status_down(&self, down: bool) {
        self.state.lock().unwrap().status_down = down;
    }

    pub fn set_membership_down(&self, down: bool) {
        self.state.lock().unwrap().membership_down = down;
    }

    /// Override the total the status endpoint reports.
    pub fn set_reported_total(&self, total: u64) {
        self.state.lock().unwrap().reported_total = Some(total);
    }

    /// Serve the first page for every page number, simulating a listing
    /// whose pagination never advances.
    pub fn set_repeat_first_page(&self, on: bool) {
        self.state.lock().unwrap().repeat_first_page = on;
    }

    pub fn grant_calls(&self) -> Vec<(ResourceId, UserId)> {
        self.state.lock().unwrap().grant_calls.clone()
    }

    pub fn grant_call_count(&self) -> usize {
        self.state.lock().unwrap().grant_calls.len()
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.state.lock().unwrap().pages_requested.clone()
    }
}

#[async_trait]
impl QueryService for FakeService {
    async fn status(&self) -> Result<ServiceStatus, FetchError> {
        let state = self.state.lock().unwrap();
        if state.status_down {
            return Err(FetchError::transport("/status.json", "connection refused"));
        }
        let resource_count = state
            .reported_total
            .unwrap_or(state.resources.len() as u64);
        Ok(ServiceStatus { resource_count })
    }

    async fn resource_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Resource>, FetchError> {
        let mut state = self.state.lock().unwrap();
        state.pages_requested.push(page);
        let effective_page = if state.repeat_first_page { 1 } else { page };
        let start = (effective_page as usize - 1) * page_size as usize;
        Ok(state
            .resources
            .iter()
            .skip(start)
            .take(page_size as usize)
            .copied()
            .collect())
    }

    async fn group_members(&self, group_id: GroupId) -> Result<Vec<UserId>, FetchError> {
        let state = self.state.lock().unwrap();
        let endpoint = format!("/api/groups/{}/members", group_id);
        if state.membership_down {
            return Err(FetchError::transport(endpoint, "connection refused"));
        }
        match state.memberships.get(&group_id) {
            Some(members) => Ok(members.clone()),
            None => Err(FetchError::rejected(
                endpoint,
                "Couldn't find resource from the URL",
            )),
        }
    }

    async fn grant_modify(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<(), GrantError> {
        let mut state = self.state.lock().unwrap();
        state.grant_calls.push((resource_id, grantee_id));
        if state.failing_grants.contains(&(resource_id, grantee_id)) {
            return Err(GrantError::Transport {
                resource_id,
                grantee_id,
                reason: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}

/// [`MemoryStore`] wrapper whose `record_grant` fails for chosen facts.
/// Reads always pass through.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<AccessFact>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_record(&self, fact: AccessFact) {
        self.failing.lock().unwrap().insert(fact);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }
}

#[async_trait]
impl AccessStore for FlakyStore {
    async fn has_access(
        &self,
        resource_id: ResourceId,
        grantee_id: UserId,
    ) -> Result<bool, StoreError> {
        self.inner.has_access(resource_id, grantee_id).await
    }

    async fn resources_owned_by(
        &self,
        owner_id: UserId,
    ) -> Result<BTreeSet<ResourceId>, StoreError> {
        self.inner.resources_owned_by(owner_id).await
    }

    async fn record_grant(&self, fact: &AccessFact) -> Result<bool, StoreError> {
        if self.failing.lock().unwrap().contains(fact) {
            return Err(StoreError::Insert {
                reason: "disk full".to_string(),
            });
        }
        self.inner.record_grant(fact).await
    }

    async fn fact_count(&self) -> Result<u64, StoreError> {
        self.inner.fact_count().await
    }
}
