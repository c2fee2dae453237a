//! # statewire core
//!
//! Bidirectional synchronization bridge between a local in-process
//! reactive scope and a remote stateful service reached through three
//! primitives: read a named value, write a named value (immediately or
//! deferred), and invoke a named remote procedure.
//!
//! This crate provides:
//! - Path-aware wires that forward reads and writes to the remote
//!   accessor and recurse lazily into nested objects
//! - An identity cache handing out one shared root wire per accessor
//! - A checksum memo gating re-synchronization to completed round trips
//! - Change-propagation bindings pulling remote properties into local
//!   scope fields, with an immediate-vs-deferred write policy
//!
//! ## Architecture
//!
//! Data flows in a loop: a remote round trip completes → the service
//! reports a new checksum to [`SyncContext::record_round_trip`] → each
//! binding's effect re-fires and pulls its declared properties through
//! the root wire into scope fields → local writes to remote state flow
//! back through a wire's `set` → next round trip.
//!
//! ## Key Invariants
//!
//! - A binding pulls if and only if the memo's checksums differ at
//!   effect time; the memo is reconciled once per round, after all
//!   effects ran
//! - Non-deferred root wires are identity-cached per accessor; the
//!   cache never keeps an accessor alive
//! - Deferred wires are never cached and never shared
//! - Property wires are rebuilt on every nested read; a stale wire
//!   simply reflects whatever the accessor currently returns

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod binding;
mod cache;
mod config;
mod context;
mod error;
mod memo;
mod path;
mod remote;
mod wire;

pub use binding::{bind, Binding, BindingModifiers, FieldSpec, LocalScope, WIRE_FIELD};
pub use config::BridgeConfig;
pub use context::{EffectHandle, SyncContext};
pub use error::{WireError, WireResult};
pub use memo::SyncMemo;
pub use path::PropertyPath;
pub use remote::{CallRecord, MemoryRemote, RemoteCall, RemoteState, SetRecord};
pub use wire::{PropertyWire, RootWire, WireRead};

// The bridge's dynamic value type.
pub use serde_json::Value;
