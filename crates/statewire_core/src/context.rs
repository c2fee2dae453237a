//! Synchronization context: checksum memo, wire cache, effect registry.
//!
//! One context is created per process (or per test) and injected into
//! every binding, rather than living as a process-wide singleton. The
//! remote service drives it through a single inbound hook,
//! [`SyncContext::record_round_trip`], invoked once per completed
//! round trip with the new checksum.

use crate::cache::WireCache;
use crate::config::BridgeConfig;
use crate::memo::SyncMemo;
use crate::remote::RemoteState;
use crate::wire::RootWire;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

type EffectFn = Box<dyn FnMut(&SyncContext) + Send>;

struct EffectSlot {
    id: u64,
    alive: AtomicBool,
    run: Mutex<EffectFn>,
}

/// Handle to a registered effect.
///
/// Dropping the handle detaches the effect from the context; teardown
/// is owned by whoever owns the handle (for bindings, the binding
/// itself).
pub struct EffectHandle {
    slot: Arc<EffectSlot>,
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        self.slot.alive.store(false, Ordering::SeqCst);
        tracing::debug!(effect = self.slot.id, "effect detached");
    }
}

/// Shared synchronization state for a set of bindings.
///
/// Holds the checksum memo (the single source of truth for "has the
/// remote state advanced"), the root-wire identity cache, and the
/// registered binding effects. All operations run synchronously on the
/// caller's turn; the only asynchrony lives inside the remote service.
pub struct SyncContext {
    config: BridgeConfig,
    reserved_prefix: Arc<str>,
    memo: RwLock<SyncMemo>,
    cache: WireCache,
    effects: Mutex<Vec<Arc<EffectSlot>>>,
    next_effect_id: AtomicU64,
}

impl SyncContext {
    /// Creates a context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    /// Creates a context with an explicit configuration.
    pub fn with_config(config: BridgeConfig) -> Self {
        let reserved_prefix = Arc::from(config.reserved_prefix.as_str());
        let memo = RwLock::new(config.initial_memo());
        Self {
            config,
            reserved_prefix,
            memo,
            cache: WireCache::new(),
            effects: Mutex::new(Vec::new()),
            next_effect_id: AtomicU64::new(0),
        }
    }

    /// Returns the context's configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns a snapshot of the checksum memo.
    pub fn memo(&self) -> SyncMemo {
        self.memo.read().clone()
    }

    /// Returns the identity-cached non-deferred root wire for `remote`.
    ///
    /// Repeated calls with the same live accessor return the same
    /// `Arc`; the cache entry vanishes when the accessor is dropped.
    /// Deferred wires are obtained from [`RootWire::deferred`] and are
    /// never cached.
    pub fn wire(&self, remote: &Arc<dyn RemoteState>) -> Arc<RootWire> {
        self.cache.wire_for(remote, &self.reserved_prefix)
    }

    /// Number of live entries in the wire identity cache.
    pub fn wire_count(&self) -> usize {
        self.cache.len()
    }

    /// Registers an effect and runs it once immediately.
    ///
    /// The initial run is how a binding performs its initial pull: the
    /// memo's default checksums differ, so a freshly registered binding
    /// effect sees an advance. Afterwards the effect is re-run by
    /// [`SyncContext::record_round_trip`] and
    /// [`SyncContext::run_effects`], and stays registered until the
    /// returned handle is dropped.
    pub fn register_effect(
        &self,
        effect: impl FnMut(&SyncContext) + Send + 'static,
    ) -> EffectHandle {
        let slot = Arc::new(EffectSlot {
            id: self.next_effect_id.fetch_add(1, Ordering::Relaxed),
            alive: AtomicBool::new(true),
            run: Mutex::new(Box::new(effect)),
        });
        self.effects.lock().push(Arc::clone(&slot));
        tracing::debug!(effect = slot.id, "effect registered");
        {
            let mut run = slot.run.lock();
            (*run)(self);
        }
        EffectHandle { slot }
    }

    /// Number of live registered effects.
    pub fn effect_count(&self) -> usize {
        let mut effects = self.effects.lock();
        effects.retain(|slot| slot.alive.load(Ordering::SeqCst));
        effects.len()
    }

    /// The inbound hook from the remote service, invoked once per
    /// completed round trip with the new checksum.
    ///
    /// Records the checksum (the prior current value becomes the
    /// previous one), runs every registered effect so bindings pull
    /// their fields, then reconciles the memo. Reconciling after the
    /// whole round — instead of per binding — means every binding
    /// observes the advance, and a later effect re-run with no new
    /// round trip pulls nothing.
    pub fn record_round_trip(&self, checksum: impl Into<String>) {
        let checksum = checksum.into();
        {
            let mut memo = self.memo.write();
            memo.record(checksum.as_str());
            tracing::debug!(
                current = memo.current(),
                previous = memo.previous(),
                "round trip recorded"
            );
        }
        self.run_effects();
        self.memo.write().mark_seen();
    }

    /// Re-runs every registered effect without touching the memo.
    ///
    /// Models the local runtime re-scheduling effects for unrelated
    /// dependency changes: checksum gating inside each binding makes
    /// this pull nothing unless a round trip is pending reconciliation.
    /// Must not be called from within an effect.
    pub fn run_effects(&self) {
        let slots: Vec<Arc<EffectSlot>> = {
            let mut effects = self.effects.lock();
            effects.retain(|slot| slot.alive.load(Ordering::SeqCst));
            effects.clone()
        };
        tracing::debug!(effects = slots.len(), "running effects");
        for slot in slots {
            // A handle dropped mid-round skips the rest of its work.
            if slot.alive.load(Ordering::SeqCst) {
                let mut run = slot.run.lock();
                (*run)(self);
            }
        }
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new()
    }
}
