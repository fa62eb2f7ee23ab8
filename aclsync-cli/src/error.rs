//! Error type for the command-line tool.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Client construction failed (bad URL, key, or timeout).
    #[error(transparent)]
    Setup(#[from] aclsync_core::ConfigError),
    #[error(transparent)]
    Store(#[from] aclsync_core::StoreError),
    #[error(transparent)]
    Engine(#[from] aclsync_core::EngineError),
}
