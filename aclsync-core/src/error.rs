//! Error types for aclsync operations

use crate::{GroupId, ResourceId, UserId};
use thiserror::Error;

/// Remote listing and membership failures.
///
/// `Rejected` covers the remote service's embedded denial: an HTTP-successful
/// response whose payload carries an explicit error message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport failure for {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Service rejected {endpoint}: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("Unexpected response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl FetchError {
    pub fn transport(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn rejected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of a single remote grant mutation.
///
/// The remote service may deny a grant inside an HTTP-successful response;
/// that is `Rejected`, distinct from a transport-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("Transport failure granting resource {resource_id} to user {grantee_id}: {reason}")]
    Transport {
        resource_id: ResourceId,
        grantee_id: UserId,
        reason: String,
    },

    #[error("Grant of resource {resource_id} to user {grantee_id} rejected: {message}")]
    Rejected {
        resource_id: ResourceId,
        grantee_id: UserId,
        message: String,
    },
}

/// Local access cache failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to open access cache at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Access cache migration failed: {reason}")]
    Migration { reason: String },

    #[error("Insert failed: {reason}")]
    Insert { reason: String },

    #[error("Query failed: {reason}")]
    Query { reason: String },

    #[error("Access cache lock poisoned")]
    LockPoisoned,
}

/// Failures that abort a whole reconciliation run.
///
/// Individual grant failures never appear here; they are isolated per triple
/// and reported in the run summary instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Catalog refresh failed: {0}")]
    Refresh(FetchError),

    #[error("Membership lookup for group {group_id} failed: {error}")]
    Membership { group_id: GroupId, error: FetchError },

    #[error("Access cache failure: {0}")]
    Store(#[from] StoreError),
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for all aclsync errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AclSyncError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Grant error: {0}")]
    Grant(#[from] GrantError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for aclsync operations.
pub type AclSyncResult<T> = Result<T, AclSyncError>;

// =============================================================================
// TESTS
// =============================================================================
