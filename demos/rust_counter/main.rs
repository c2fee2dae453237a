//! Basic statewire example - Counter
//!
//! This example demonstrates the bridge end to end:
//! - Binding a local scope to a remote instance
//! - Checksum-gated pulls on completed round trips
//! - Immediate and deferred writes through wires
//! - Call-forwarding for remote procedures
//!
//! Run with: cargo run -p rust_counter

use parking_lot::Mutex;
use serde_json::json;
use statewire_core::{
    bind, BindingModifiers, FieldSpec, LocalScope, MemoryRemote, RootWire, SyncContext, Value,
    WireRead,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A toy reactive scope: a named field map plus the installed wire.
#[derive(Default)]
struct CounterScope {
    fields: Mutex<HashMap<String, Value>>,
    wire: Mutex<Option<Arc<RootWire>>>,
}

impl CounterScope {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.lock().get(name).cloned()
    }

    fn wire(&self) -> Arc<RootWire> {
        self.wire.lock().clone().expect("binding installs the wire")
    }
}

impl LocalScope for CounterScope {
    fn assign(&self, field: &str, value: WireRead) {
        // Primitives land as plain field values; nested objects stay
        // reachable through the installed wire.
        if let Some(value) = value.as_value() {
            println!("  scope.{field} = {value}");
            self.fields.lock().insert(field.to_string(), value.clone());
        }
    }

    fn install_wire(&self, wire: Arc<RootWire>) {
        *self.wire.lock() = Some(wire);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let ctx = SyncContext::new();
    let remote = MemoryRemote::with_state(json!({
        "count": 0,
        "label": "clicks",
        "profile": {"owner": "ada"},
    }));
    remote.script_procedure("reset", json!(0));

    let scope = Arc::new(CounterScope::default());
    let binding = bind(
        &ctx,
        &remote.as_remote(),
        scope.clone(),
        FieldSpec::names(["count", "label"]),
        BindingModifiers::default(),
    );

    println!("after bind (initial pull):");
    println!("  count = {:?}", scope.field("count"));

    // A local write flows out through the wire, the round trip pulls
    // the advanced state back in.
    scope.wire().set("count", json!(41)).unwrap();
    remote.complete_round_trip(&ctx, "c1");
    println!("after round trip c1:");
    println!("  count = {:?}", scope.field("count"));

    // Deferred writes are staged until an external flush.
    let deferred = scope.wire().deferred();
    deferred.set("count", json!(42)).unwrap();
    println!(
        "staged deferred writes: {}",
        remote.deferred_sets().len()
    );

    // Nested objects read as wires; writes compose dot paths.
    if let WireRead::Nested(profile) = scope.wire().read("profile").unwrap() {
        profile.set("owner", json!("grace")).unwrap();
    }

    // An absent key is a procedure: the call forwards to the remote.
    if let WireRead::Procedure(reset) = scope.wire().read("reset").unwrap() {
        let result = reset.invoke(vec![]).unwrap();
        println!("reset() -> {result}");
    }

    remote.complete_round_trip(&ctx, "c2");
    println!("after round trip c2:");
    println!("  count = {:?}", scope.field("count"));

    drop(binding);
    println!("binding dropped; effects detached: {}", ctx.effect_count() == 0);
}
