//! Weak identity cache for root wires.
//!
//! Keyed by accessor pointer identity: repeated wraps of the same live
//! accessor hand back the same `Arc<RootWire>`. Wires hold only weak
//! accessor references, so cache membership never keeps an accessor
//! alive; entries for dropped accessors vanish on the next access.

use crate::remote::RemoteState;
use crate::wire::RootWire;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

struct CacheEntry {
    /// Liveness and identity guard for the keyed accessor.
    guard: Weak<dyn RemoteState>,
    wire: Arc<RootWire>,
}

/// Identity cache mapping accessors to their non-deferred root wire.
#[derive(Default)]
pub(crate) struct WireCache {
    entries: Mutex<HashMap<usize, CacheEntry>>,
}

impl WireCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached root wire for `remote`, constructing and
    /// registering one if needed. Deferred wires never pass through
    /// here; they are built fresh by [`RootWire::deferred`].
    pub(crate) fn wire_for(
        &self,
        remote: &Arc<dyn RemoteState>,
        reserved_prefix: &Arc<str>,
    ) -> Arc<RootWire> {
        let key = Arc::as_ptr(remote) as *const () as usize;
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.guard.strong_count() > 0);

        if let Some(entry) = entries.get(&key) {
            // The allocator may hand a new accessor the address of a
            // dead one, so the key alone is not proof of identity.
            if let Some(live) = entry.guard.upgrade() {
                if Arc::ptr_eq(&live, remote) {
                    return Arc::clone(&entry.wire);
                }
            }
        }

        let wire = Arc::new(RootWire::new(remote, false, Arc::clone(reserved_prefix)));
        entries.insert(
            key,
            CacheEntry {
                guard: Arc::downgrade(remote),
                wire: Arc::clone(&wire),
            },
        );
        wire
    }

    /// Number of live entries.
    pub(crate) fn len(&self) -> usize {
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.guard.strong_count() > 0);
        entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;

    fn prefix() -> Arc<str> {
        Arc::from("__")
    }

    #[test]
    fn identity_stability() {
        let cache = WireCache::new();
        let remote = MemoryRemote::new();
        let accessor = remote.as_remote();

        let first = cache.wire_for(&accessor, &prefix());
        let second = cache.wire_for(&accessor, &prefix());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_accessors_get_distinct_wires() {
        let cache = WireCache::new();
        let a = MemoryRemote::new().as_remote();
        let b = MemoryRemote::new().as_remote();

        let wire_a = cache.wire_for(&a, &prefix());
        let wire_b = cache.wire_for(&b, &prefix());
        assert!(!Arc::ptr_eq(&wire_a, &wire_b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entries_vanish_with_their_accessor() {
        let cache = WireCache::new();
        let remote = MemoryRemote::new();
        let accessor = remote.as_remote();

        let _wire = cache.wire_for(&accessor, &prefix());
        assert_eq!(cache.len(), 1);

        drop(accessor);
        drop(remote);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn cache_does_not_keep_accessor_alive() {
        let cache = WireCache::new();
        let remote = MemoryRemote::new();
        let accessor = remote.as_remote();
        let observer = Arc::downgrade(&accessor);

        let _wire = cache.wire_for(&accessor, &prefix());

        drop(accessor);
        drop(remote);
        // Only the cache referenced the accessor; it must not have
        // kept it alive.
        assert!(observer.upgrade().is_none());
    }
}
