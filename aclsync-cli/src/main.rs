//! aclsync entry point.
//!
//! Loads the TOML config, opens the cache, and reconciles each configured
//! group in order. Summaries go to stdout, logs to stderr. The process exits
//! non-zero only when a run aborts (config, cache, or service-level failure);
//! individual grant failures are reported in the summary and retried on the
//! next invocation.

use aclsync_cli::config::CliConfig;
use aclsync_cli::error::CliError;
use aclsync_client::RestClient;
use aclsync_core::GroupId;
use aclsync_engine::{ReconcileEngine, ReconcileOptions};
use aclsync_store::SqliteStore;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();

    let config = CliConfig::load()?;
    let client = RestClient::new(
        &config.base_url,
        &config.api_key,
        Duration::from_millis(config.request_timeout_ms),
    )?;
    let store = SqliteStore::open(&config.cache_path).await?;
    let engine = ReconcileEngine::new(
        Arc::new(client),
        Arc::new(store),
        ReconcileOptions {
            page_size: config.page_size,
        },
    );

    // Groups are independent: one aborted run must not block the rest. The
    // first abort still decides the exit code.
    let mut first_error: Option<CliError> = None;
    let mut incomplete = 0usize;
    for group_id in config.group_ids.iter().copied().map(GroupId::from) {
        match engine.reconcile(group_id).await {
            Ok(summary) => {
                if !summary.failures.is_empty() || !summary.unrecorded.is_empty() {
                    incomplete += 1;
                }
                print!("{}", summary);
            }
            Err(err) => {
                tracing::error!(group = group_id.as_i64(), error = %err, "reconciliation aborted");
                if first_error.is_none() {
                    first_error = Some(err.into());
                }
            }
        }
    }

    if incomplete > 0 {
        tracing::warn!(
            groups = incomplete,
            "finished with failed or unrecorded grants; rerun to retry"
        );
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()
        .ok();
}
