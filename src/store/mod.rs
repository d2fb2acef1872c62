pub mod adapter;
pub mod memory;
pub mod rest;
pub mod traits;

pub use adapter::CatalogStore;
pub use memory::MemoryKvStore;
pub use rest::RestKvStore;
pub use traits::KvStore;

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Mint a push id from the clock plus a per-store counter
///
/// Not globally coordinated; uniqueness only has to hold within one store
/// instance, matching the backend's client-minted push keys.
pub(crate) fn push_id_with_counter(counter: &AtomicU64) -> String {
    let seq = counter.fetch_add(1, Ordering::Relaxed);
    format!("-{:x}{:04x}", Utc::now().timestamp_millis(), seq)
}
