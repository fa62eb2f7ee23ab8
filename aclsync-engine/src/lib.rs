//! aclsync engine - group access reconciliation
//!
//! Brings remote access-control state into symmetry across a group: after a
//! successful run, every member has modify access to every resource owned by
//! every other member. The engine composes four parts:
//!
//! - [`CatalogFetcher`] seeds the access cache with owner self-facts from the
//!   remote catalog, page by page.
//! - [`MembershipResolver`] snapshots the group's current members.
//! - [`GrantApplier`] issues one remote grant mutation at a time.
//! - [`ReconcileEngine`] diffs cached facts against the membership and applies
//!   only the missing grants, recording outcomes so repeated runs converge to
//!   zero remote calls.
//!
//! The access cache is the sole source of already-done truth; there is no
//! other cross-run state.

pub mod catalog;
pub mod grant;
pub mod membership;
pub mod reconcile;

pub use catalog::CatalogFetcher;
pub use grant::GrantApplier;
pub use membership::MembershipResolver;
pub use reconcile::{ReconcileEngine, ReconcileOptions, DEFAULT_PAGE_SIZE};
