//! Catalog refresh: pull the resource inventory into the access cache.

use aclsync_client::QueryService;
use aclsync_core::{AccessFact, EngineError, RefreshStats};
use aclsync_store::AccessStore;
use std::sync::Arc;

/// Pulls the full query catalog from the remote service and records the owner
/// self-fact for every listed resource.
pub struct CatalogFetcher {
    service: Arc<dyn QueryService>,
    store: Arc<dyn AccessStore>,
    page_size: u32,
}

impl CatalogFetcher {
    pub fn new(
        service: Arc<dyn QueryService>,
        store: Arc<dyn AccessStore>,
        page_size: u32,
    ) -> Self {
        Self {
            service,
            store,
            page_size,
        }
    }

    /// Refresh the cache from the remote catalog.
    ///
    /// The reported total bounds the number of pages requested; within that
    /// budget the fetch stops as soon as a page comes back empty or
    /// contributes no previously-unseen fact. Inserts are idempotent, so an
    /// aborted refresh keeps everything committed by earlier pages and a
    /// retry resumes cheaply.
    pub async fn refresh(&self) -> Result<RefreshStats, EngineError> {
        let status = self.service.status().await.map_err(EngineError::Refresh)?;
        // One row per page is the smallest request that still walks the
        // catalog; the clamped size drives both the budget and the requests.
        let page_size = self.page_size.max(1);
        // Probes at least one page even when the service reports zero.
        let page_budget = u32::try_from(status.resource_count / u64::from(page_size) + 1)
            .unwrap_or(u32::MAX);

        let mut stats = RefreshStats::default();
        for page in 1..=page_budget {
            let resources = self
                .service
                .resource_page(page, page_size)
                .await
                .map_err(EngineError::Refresh)?;
            stats.pages_fetched += 1;

            if resources.is_empty() {
                break;
            }

            let mut new_on_page = 0u64;
            for resource in &resources {
                stats.resources_listed += 1;
                let fact = AccessFact::self_fact(resource.id, resource.owner_id);
                if self.store.record_grant(&fact).await? {
                    new_on_page += 1;
                }
            }
            stats.new_facts += new_on_page;

            if new_on_page == 0 {
                break;
            }
        }

        tracing::info!(
            pages = stats.pages_fetched,
            listed = stats.resources_listed,
            new_facts = stats.new_facts,
            "catalog refresh complete"
        );
        Ok(stats)
    }
}
