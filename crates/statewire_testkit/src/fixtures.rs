//! Test fixtures: recording scope and bridge harness.

use parking_lot::Mutex;
use serde_json::Value;
use statewire_core::{
    bind, Binding, BindingModifiers, FieldSpec, LocalScope, MemoryRemote, RootWire, SyncContext,
    WireRead,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A local scope that records everything assigned to it.
#[derive(Default)]
pub struct RecordingScope {
    assigns: Mutex<Vec<(String, WireRead)>>,
    wires: Mutex<Vec<Arc<RootWire>>>,
}

impl RecordingScope {
    /// Creates a new recording scope.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns all assignments in order.
    pub fn assignments(&self) -> Vec<(String, WireRead)> {
        self.assigns.lock().clone()
    }

    /// Returns the number of assignments so far.
    pub fn assignment_count(&self) -> usize {
        self.assigns.lock().len()
    }

    /// Returns the most recent read assigned to `field`.
    pub fn last(&self, field: &str) -> Option<WireRead> {
        self.assigns
            .lock()
            .iter()
            .rev()
            .find(|(f, _)| f == field)
            .map(|(_, read)| read.clone())
    }

    /// Returns the most recent primitive value assigned to `field`.
    pub fn last_value(&self, field: &str) -> Option<Value> {
        self.last(field).and_then(WireRead::into_value)
    }

    /// Returns the wires installed on this scope, in order.
    pub fn installed_wires(&self) -> Vec<Arc<RootWire>> {
        self.wires.lock().clone()
    }
}

impl LocalScope for RecordingScope {
    fn assign(&self, field: &str, value: WireRead) {
        self.assigns.lock().push((field.to_string(), value));
    }

    fn install_wire(&self, wire: Arc<RootWire>) {
        self.wires.lock().push(wire);
    }
}

/// A fully wired bridge for tests: context, in-memory remote and
/// recording scope.
pub struct BridgeHarness {
    /// The synchronization context.
    pub ctx: SyncContext,
    /// The in-memory remote service.
    pub remote: Arc<MemoryRemote>,
    /// The recording scope bindings write into.
    pub scope: Arc<RecordingScope>,
    rounds: AtomicU64,
}

impl BridgeHarness {
    /// Creates a harness over an empty remote state tree.
    pub fn new() -> Self {
        Self::with_state(Value::Object(serde_json::Map::new()))
    }

    /// Creates a harness over the given remote state tree.
    pub fn with_state(state: Value) -> Self {
        Self {
            ctx: SyncContext::new(),
            remote: MemoryRemote::with_state(state),
            scope: RecordingScope::new(),
            rounds: AtomicU64::new(0),
        }
    }

    /// Binds the harness scope to the harness remote.
    pub fn bind(&self, spec: FieldSpec, modifiers: BindingModifiers) -> Binding {
        bind(
            &self.ctx,
            &self.remote.as_remote(),
            self.scope.clone(),
            spec,
            modifiers,
        )
    }

    /// Completes a round trip with an explicit checksum.
    pub fn round_trip(&self, checksum: &str) {
        self.remote.complete_round_trip(&self.ctx, checksum);
    }

    /// Completes a round trip with a generated checksum (`rt-1`,
    /// `rt-2`, ...), each distinct from the last.
    pub fn next_round_trip(&self) -> String {
        let checksum = format!("rt-{}", self.rounds.fetch_add(1, Ordering::SeqCst) + 1);
        self.round_trip(&checksum);
        checksum
    }
}

impl Default for BridgeHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn harness_pulls_into_scope() {
        let harness = BridgeHarness::with_state(json!({"count": 1}));
        let _binding = harness.bind(FieldSpec::names(["count"]), BindingModifiers::default());

        // Initial pull at bind time, second pull on the round trip.
        assert_eq!(harness.scope.last_value("count"), Some(json!(1)));
        assert_eq!(harness.scope.assignment_count(), 1);

        harness.round_trip("c1");
        assert_eq!(harness.scope.assignment_count(), 2);
    }

    #[test]
    fn generated_checksums_are_distinct() {
        let harness = BridgeHarness::new();
        let first = harness.next_round_trip();
        let second = harness.next_round_trip();
        assert_ne!(first, second);
    }

    #[test]
    fn scope_records_installed_wire() {
        let harness = BridgeHarness::new();
        let binding = harness.bind(FieldSpec::names(["x"]), BindingModifiers::default());

        let wires = harness.scope.installed_wires();
        assert_eq!(wires.len(), 1);
        assert!(Arc::ptr_eq(&wires[0], binding.wire()));
    }
}
