//! Ordered, id-keyed registry of per-tick callbacks.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use epilink_core::{CallbackId, WorldSnapshot};

/// A callback invoked once per simulation tick with that tick's snapshot.
pub type TickCallback = Arc<dyn Fn(&WorldSnapshot) + Send + Sync>;

/// Ordered mapping of [`CallbackId`] to tick callbacks.
///
/// Registration and removal are safe from any thread, including from
/// inside a callback during dispatch: [`dispatch`] copies the entry
/// list under the lock and releases it before invoking anything, so a
/// re-entrant `register`/`remove` never deadlocks and only affects
/// subsequent ticks.
///
/// [`dispatch`]: TickCallbackRegistry::dispatch
pub struct TickCallbackRegistry {
    entries: Mutex<IndexMap<CallbackId, TickCallback>>,
}

impl TickCallbackRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Store `callback` and return its fresh, never-reused ID.
    pub fn register(&self, callback: TickCallback) -> CallbackId {
        let id = CallbackId::next();
        self.entries.lock().unwrap().insert(id, callback);
        id
    }

    /// Remove the callback with `id` if present. A no-op on absent or
    /// already-removed IDs — never fails.
    pub fn remove(&self, id: CallbackId) {
        self.entries.lock().unwrap().shift_remove(&id);
    }

    /// Invoke every currently registered callback exactly once, in
    /// registration order, with `snapshot`.
    ///
    /// The set of callbacks is fixed at entry; entries added or removed
    /// by a callback take effect from the next dispatch.
    pub fn dispatch(&self, snapshot: &WorldSnapshot) {
        let entries: Vec<TickCallback> = {
            let map = self.entries.lock().unwrap();
            map.values().cloned().collect()
        };
        for callback in entries {
            callback(snapshot);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl Default for TickCallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epilink_core::{EpisodeId, TickId, Timestamp};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot::new(EpisodeId(1), TickId(1), Timestamp::default(), vec![])
    }

    fn recording_callback(log: &Arc<Mutex<Vec<u32>>>, tag: u32) -> TickCallback {
        let log = Arc::clone(log);
        Arc::new(move |_snap| log.lock().unwrap().push(tag))
    }

    #[test]
    fn dispatch_runs_in_registration_order() {
        let registry = TickCallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in [1u32, 2, 3] {
            registry.register(recording_callback(&log, tag));
        }
        registry.dispatch(&snapshot());
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn removed_callback_is_not_invoked() {
        // Three callbacks registered, the middle one removed, one tick.
        let registry = TickCallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _id1 = registry.register(recording_callback(&log, 1));
        let id2 = registry.register(recording_callback(&log, 2));
        let _id3 = registry.register(recording_callback(&log, 3));

        registry.remove(id2);
        registry.dispatch(&snapshot());

        assert_eq!(*log.lock().unwrap(), vec![1, 3]);
    }

    #[test]
    fn remove_absent_id_is_noop() {
        let registry = TickCallbackRegistry::new();
        let id = registry.register(Arc::new(|_| {}));
        registry.remove(id);
        registry.remove(id); // second removal: still fine
        registry.remove(CallbackId::next()); // never registered: fine
        assert!(registry.is_empty());
    }

    #[test]
    fn reentrant_registration_affects_next_dispatch_only() {
        let registry = Arc::new(TickCallbackRegistry::new());
        let inner_calls = Arc::new(AtomicUsize::new(0));

        let reg = Arc::clone(&registry);
        let calls = Arc::clone(&inner_calls);
        registry.register(Arc::new(move |_snap| {
            // Register a new callback from inside dispatch.
            let calls = Arc::clone(&calls);
            reg.register(Arc::new(move |_s| {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        registry.dispatch(&snapshot());
        assert_eq!(inner_calls.load(Ordering::SeqCst), 0, "not this tick");

        registry.dispatch(&snapshot());
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1, "from the next tick");
    }

    #[test]
    fn reentrant_removal_does_not_deadlock() {
        let registry = Arc::new(TickCallbackRegistry::new());
        let reg = Arc::clone(&registry);
        let self_id = Arc::new(Mutex::new(None::<CallbackId>));
        let slot = Arc::clone(&self_id);
        let id = registry.register(Arc::new(move |_snap| {
            if let Some(id) = *slot.lock().unwrap() {
                reg.remove(id);
            }
        }));
        *self_id.lock().unwrap() = Some(id);

        registry.dispatch(&snapshot());
        assert!(registry.is_empty(), "callback removed itself");
        registry.dispatch(&snapshot()); // nothing to run, nothing to hang on
    }

    proptest! {
        /// Survivors of an arbitrary register/remove sequence fire in
        /// registration order, each exactly once.
        #[test]
        fn survivors_fire_once_in_order(keep in proptest::collection::vec(any::<bool>(), 1..24)) {
            let registry = TickCallbackRegistry::new();
            let log = Arc::new(Mutex::new(Vec::new()));

            let mut expected = Vec::new();
            for (tag, &kept) in keep.iter().enumerate() {
                let id = registry.register(recording_callback(&log, tag as u32));
                if kept {
                    expected.push(tag as u32);
                } else {
                    registry.remove(id);
                }
            }

            registry.dispatch(&snapshot());
            prop_assert_eq!(&*log.lock().unwrap(), &expected);
        }
    }
}
