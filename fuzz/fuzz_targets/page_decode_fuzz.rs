//! Fuzz test for catalog page decoding
//!
//! This fuzz target feeds arbitrary bytes to the catalog page decoder to find:
//! - Panics or crashes
//! - Invariant violations in the decoded resources
//!
//! Run with: cargo +nightly fuzz run page_decode_fuzz -- -max_total_time=60

#![no_main]

use aclsync_client::ResourcePage;
use aclsync_core::{AccessFact, Resource, ResourceId, UserId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding either rejects the bytes or produces a page; it never panics.
    if let Ok(page) = serde_json::from_slice::<ResourcePage>(data) {
        for summary in page.results {
            let resource = Resource::from(summary);

            // Conversion preserves both ids exactly.
            assert_eq!(resource.id, ResourceId(summary.id));
            assert_eq!(resource.owner_id, UserId(summary.owner.id));

            // Every listed resource yields a well-formed owner self-fact.
            let fact = AccessFact::self_fact(resource.id, resource.owner_id);
            assert!(fact.is_self_fact(), "self-fact must grant to its owner");
            assert_eq!(fact.resource_id, resource.id);
        }
    }
});
