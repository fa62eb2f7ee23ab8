//! Reconciliation: diff cached access state against group membership and
//! apply only the missing grants.

use crate::{CatalogFetcher, GrantApplier, MembershipResolver};
use aclsync_client::QueryService;
use aclsync_core::{AccessFact, EngineError, GrantFailure, GroupId, ReconcileSummary};
use aclsync_store::AccessStore;
use chrono::Utc;
use std::sync::Arc;

/// Page size used by the remote catalog listing unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Engine tuning knobs, received already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Resources requested per catalog page.
    pub page_size: u32,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Orchestrates one reconciliation run per group.
///
/// A run is a linear four-step sequence: refresh the catalog into the cache,
/// snapshot the membership, walk every ordered (owner, grantee) pair of
/// distinct members over the owner's resources, and apply whatever grants the
/// cache says are missing. Checking the cache before every remote call keeps
/// the remote mutation count proportional to the number of missing grants, so
/// repeated runs converge to zero remote calls.
pub struct ReconcileEngine {
    store: Arc<dyn AccessStore>,
    fetcher: CatalogFetcher,
    membership: MembershipResolver,
    applier: GrantApplier,
}

impl ReconcileEngine {
    pub fn new(
        service: Arc<dyn QueryService>,
        store: Arc<dyn AccessStore>,
        options: ReconcileOptions,
    ) -> Self {
        let fetcher = CatalogFetcher::new(
            Arc::clone(&service),
            Arc::clone(&store),
            options.page_size,
        );
        let membership = MembershipResolver::new(Arc::clone(&service));
        let applier = GrantApplier::new(service);
        Self {
            store,
            fetcher,
            membership,
            applier,
        }
    }

    /// Reconcile one group to full access symmetry.
    ///
    /// Aborts only when the catalog refresh, the membership lookup, or a
    /// cache read fails; those invalidate the premise that ownership and
    /// membership data is complete. Individual grant failures never abort the
    /// loop; they are collected into the summary. A local record failure
    /// after a successful remote grant lands in the summary's `unrecorded`
    /// list; the next run detects the drift through `has_access` and repeats
    /// the grant harmlessly.
    pub async fn reconcile(&self, group_id: GroupId) -> Result<ReconcileSummary, EngineError> {
        let started_at = Utc::now();
        tracing::info!(group = %group_id, "reconciliation started");

        let refresh = self.fetcher.refresh().await?;
        let members = self
            .membership
            .members(group_id)
            .await
            .map_err(|error| EngineError::Membership { group_id, error })?;

        let mut attempted = 0u64;
        let mut granted = 0u64;
        let mut already_present = 0u64;
        let mut failures: Vec<GrantFailure> = Vec::new();
        let mut unrecorded: Vec<AccessFact> = Vec::new();

        for owner in &members {
            let owned = self.store.resources_owned_by(*owner).await?;
            if owned.is_empty() {
                continue;
            }
            for grantee in &members {
                if grantee == owner {
                    continue;
                }
                for resource_id in &owned {
                    if self.store.has_access(*resource_id, *grantee).await? {
                        already_present += 1;
                        continue;
                    }

                    attempted += 1;
                    let fact = AccessFact::new(*resource_id, *owner, *grantee);
                    match self.applier.grant(*resource_id, *grantee).await {
                        Ok(()) => match self.store.record_grant(&fact).await {
                            Ok(_) => {
                                granted += 1;
                                tracing::debug!(fact = %fact, "grant applied");
                            }
                            Err(store_err) => {
                                tracing::warn!(
                                    fact = %fact,
                                    error = %store_err,
                                    "grant applied remotely but not recorded locally"
                                );
                                unrecorded.push(fact);
                            }
                        },
                        Err(grant_err) => {
                            tracing::warn!(fact = %fact, error = %grant_err, "grant failed");
                            failures.push(GrantFailure {
                                fact,
                                error: grant_err,
                            });
                        }
                    }
                }
            }
        }

        let summary = ReconcileSummary {
            group_id,
            members: members.len(),
            refresh,
            attempted,
            granted,
            already_present,
            failures,
            unrecorded,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            group = %group_id,
            attempted = summary.attempted,
            granted = summary.granted,
            already_present = summary.already_present,
            failed = summary.failed(),
            "reconciliation finished"
        );
        Ok(summary)
    }
}
