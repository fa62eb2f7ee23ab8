//! Fuzz test for response envelope handling
//!
//! This fuzz target exercises the pieces that inspect raw service responses:
//! the embedded denial-message probe and the status/membership decoders. It
//! looks for:
//! - Panics or crashes
//! - Empty messages reported as denials
//!
//! Run with: cargo +nightly fuzz run envelope_fuzz -- -max_total_time=60

#![no_main]

use aclsync_client::{embedded_message, MemberEntry, ServiceStatus};
use aclsync_core::UserId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        // A detected denial always carries a non-empty message.
        if let Some(message) = embedded_message(&value) {
            assert!(!message.is_empty(), "denial message must be non-empty");
        }
    }

    if let Ok(status) = serde_json::from_slice::<ServiceStatus>(data) {
        // The count is whatever the service claims; decoding it is the only
        // invariant here.
        let _ = status.resource_count;
    }

    if let Ok(members) = serde_json::from_slice::<Vec<MemberEntry>>(data) {
        for entry in members {
            let id: UserId = entry.into();
            assert_eq!(id.as_i64(), entry.id);
        }
    }
});
