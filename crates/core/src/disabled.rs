//! In-memory disabled-region state.
//!
//! Holds the set of region ids a reviewer has disabled. Hit-testing skips
//! these ids and the overlay never highlights them. The set lives for the
//! lifetime of the process and is not persisted.

use std::collections::HashSet;

use indexmap::IndexSet;
use tokio::sync::RwLock;

/// Set of disabled region ids.
///
/// Thread-safe via interior `RwLock`: reads run concurrently, writes are
/// serialized. Designed to be wrapped in `Arc` and shared across handlers.
#[derive(Debug, Default)]
pub struct DisabledRegions {
    ids: RwLock<IndexSet<String>>,
}

impl DisabledRegions {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one region as disabled or re-enable it. Idempotent.
    pub async fn set_disabled(&self, id: &str, disabled: bool) {
        let mut ids = self.ids.write().await;
        apply(&mut ids, id, disabled);
    }

    /// Apply [`set_disabled`](Self::set_disabled) to every id, in order,
    /// under a single write lock.
    pub async fn set_many_disabled<I, S>(&self, ids: I, disabled: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = self.ids.write().await;
        for id in ids {
            apply(&mut set, id.as_ref(), disabled);
        }
    }

    pub async fn is_disabled(&self, id: &str) -> bool {
        self.ids.read().await.contains(id)
    }

    /// Remove every id.
    pub async fn clear(&self) {
        self.ids.write().await.clear();
    }

    /// Disabled ids in the order they were first disabled.
    pub async fn snapshot(&self) -> Vec<String> {
        self.ids.read().await.iter().cloned().collect()
    }

    /// Point-in-time copy for lookups that must not hold the lock, such as
    /// a hit-test skip predicate.
    pub async fn snapshot_set(&self) -> HashSet<String> {
        self.ids.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.ids.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.read().await.is_empty()
    }
}

fn apply(set: &mut IndexSet<String>, id: &str, disabled: bool) {
    if disabled {
        if !set.contains(id) {
            set.insert(id.to_string());
        }
    } else {
        set.shift_remove(id);
    }
}
