use crate::error::CatalogError;
use crate::store::{CatalogStore, KvStore};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::warn;

/// Where one (user, property) pair sits in the toggle lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// Settled; the bool is the current membership
    Idle(bool),
    /// A remote write is in flight; the bool is the membership being written
    Pending(bool),
}

/// What a toggle call did
#[derive(Debug)]
pub enum ToggleOutcome {
    /// The remote write landed; the bool is the new membership
    Committed(bool),
    /// A write for this id was already in flight; call dropped, nothing sent
    InFlight,
    /// The remote write failed and the optimistic change was reverted
    Failed(CatalogError),
}

#[derive(Default)]
struct Inner {
    ids: HashSet<String>,
    pending: HashSet<String>,
}

/// Optimistic view of one user's favorite set
///
/// Membership flips locally the moment a toggle starts and only reverts if
/// the remote write fails, so the UI gets instant feedback. Per property id
/// at most one write is in flight; re-entrant toggles on a pending id are
/// dropped, not queued. The lock is never held across an await point.
#[derive(Default)]
pub struct FavoritesSync {
    inner: Mutex<Inner>,
}

impl FavoritesSync {
    pub fn new(ids: HashSet<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ids,
                pending: HashSet::new(),
            }),
        }
    }

    /// Replace the whole set from a fresh fetch; pending flags are cleared
    pub fn reload(&self, ids: HashSet<String>) {
        let mut inner = self.inner.lock().expect("favorites lock poisoned");
        inner.ids = ids;
        inner.pending.clear();
    }

    pub fn is_favorite(&self, property_id: &str) -> bool {
        let inner = self.inner.lock().expect("favorites lock poisoned");
        inner.ids.contains(property_id)
    }

    pub fn state(&self, property_id: &str) -> ToggleState {
        let inner = self.inner.lock().expect("favorites lock poisoned");
        let member = inner.ids.contains(property_id);
        if inner.pending.contains(property_id) {
            ToggleState::Pending(member)
        } else {
            ToggleState::Idle(member)
        }
    }

    /// Snapshot of the current (optimistic) favorite ids
    pub fn ids(&self) -> HashSet<String> {
        let inner = self.inner.lock().expect("favorites lock poisoned");
        inner.ids.clone()
    }

    /// Drop an id locally without any remote write
    ///
    /// Used when the referenced property is deleted; the favorite relation
    /// is then stale and must not linger in the local set.
    pub fn forget(&self, property_id: &str) {
        let mut inner = self.inner.lock().expect("favorites lock poisoned");
        inner.ids.remove(property_id);
    }

    /// Transition Idle -> Pending, applying the membership flip optimistically
    ///
    /// Returns the target membership the remote write must establish, or
    /// `None` if a write for this id is already pending (caller sends
    /// nothing). Exposed so the transition table is testable without a store.
    pub fn begin_toggle(&self, property_id: &str) -> Option<bool> {
        let mut inner = self.inner.lock().expect("favorites lock poisoned");
        if !inner.pending.insert(property_id.to_string()) {
            return None;
        }
        let target = !inner.ids.contains(property_id);
        if target {
            inner.ids.insert(property_id.to_string());
        } else {
            inner.ids.remove(property_id);
        }
        Some(target)
    }

    /// Transition Pending -> Idle, reverting the optimistic flip on failure
    pub fn finish_toggle(&self, property_id: &str, target: bool, succeeded: bool) {
        let mut inner = self.inner.lock().expect("favorites lock poisoned");
        inner.pending.remove(property_id);
        if !succeeded {
            if target {
                inner.ids.remove(property_id);
            } else {
                inner.ids.insert(property_id.to_string());
            }
        }
    }

    /// Toggle a property's membership with optimistic update and rollback
    ///
    /// Issues exactly one remote write per accepted call. Failures come back
    /// as a value; nothing propagates into the rendering layer.
    pub async fn toggle<S: KvStore>(
        &self,
        store: &CatalogStore<S>,
        user_id: &str,
        property_id: &str,
    ) -> ToggleOutcome {
        let Some(target) = self.begin_toggle(property_id) else {
            return ToggleOutcome::InFlight;
        };

        let result = if target {
            store.add_favorite(user_id, property_id).await
        } else {
            store.remove_favorite(user_id, property_id).await
        };

        match result {
            Ok(()) => {
                self.finish_toggle(property_id, target, true);
                ToggleOutcome::Committed(target)
            }
            Err(err) => {
                warn!("favorite toggle for {} failed, reverting: {}", property_id, err);
                self.finish_toggle(property_id, target, false);
                ToggleOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;

    fn sync_with(ids: &[&str]) -> FavoritesSync {
        FavoritesSync::new(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn begin_applies_the_flip_before_any_remote_confirmation() {
        let sync = sync_with(&[]);
        let target = sync.begin_toggle("x").unwrap();
        assert!(target);
        assert!(sync.is_favorite("x"));
        assert_eq!(sync.state("x"), ToggleState::Pending(true));
    }

    #[test]
    fn reentrant_begin_on_a_pending_id_is_dropped() {
        let sync = sync_with(&[]);
        assert!(sync.begin_toggle("x").is_some());
        assert!(sync.begin_toggle("x").is_none());
        // A different id is unaffected
        assert!(sync.begin_toggle("y").is_some());
    }

    #[test]
    fn failed_finish_reverts_the_optimistic_flip() {
        let sync = sync_with(&[]);
        let target = sync.begin_toggle("x").unwrap();
        sync.finish_toggle("x", target, false);
        assert!(!sync.is_favorite("x"));
        assert_eq!(sync.state("x"), ToggleState::Idle(false));
    }

    #[tokio::test]
    async fn toggle_on_a_pending_id_sends_nothing() {
        let store = CatalogStore::new(MemoryKvStore::new());
        let sync = sync_with(&[]);
        let target = sync.begin_toggle("x").unwrap();

        let outcome = sync.toggle(&store, "u1", "x").await;
        assert!(matches!(outcome, ToggleOutcome::InFlight));
        assert!(store.get_favorite_ids("u1").await.unwrap().is_empty());

        sync.finish_toggle("x", target, true);
        assert_eq!(sync.state("x"), ToggleState::Idle(true));
    }

    #[tokio::test]
    async fn toggle_twice_lands_back_where_it_started() {
        let store = CatalogStore::new(MemoryKvStore::new());
        let sync = sync_with(&[]);

        let first = sync.toggle(&store, "u1", "x").await;
        assert!(matches!(first, ToggleOutcome::Committed(true)));
        assert!(store.get_favorite_ids("u1").await.unwrap().contains("x"));

        let second = sync.toggle(&store, "u1", "x").await;
        assert!(matches!(second, ToggleOutcome::Committed(false)));
        assert!(store.get_favorite_ids("u1").await.unwrap().is_empty());
        assert!(!sync.is_favorite("x"));
    }

    #[tokio::test]
    async fn remote_failure_reverts_and_reports_without_panicking() {
        let kv = MemoryKvStore::new();
        kv.set_fail_writes(true);
        let store = CatalogStore::new(kv);
        let sync = sync_with(&[]);

        let outcome = sync.toggle(&store, "u1", "x").await;
        assert!(matches!(outcome, ToggleOutcome::Failed(CatalogError::Store(_))));
        assert!(!sync.is_favorite("x"));
        assert_eq!(sync.state("x"), ToggleState::Idle(false));
    }

    #[tokio::test]
    async fn removal_failure_restores_membership() {
        let kv = MemoryKvStore::new();
        kv.set_fail_writes(true);
        let store = CatalogStore::new(kv);
        let sync = sync_with(&["x"]);

        let outcome = sync.toggle(&store, "u1", "x").await;
        assert!(matches!(outcome, ToggleOutcome::Failed(_)));
        assert!(sync.is_favorite("x"));
    }
}
