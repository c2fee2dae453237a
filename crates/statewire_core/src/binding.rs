//! Change-propagation bindings.
//!
//! A binding connects a local reactive scope to one remote instance:
//! it installs the shared root wire on the scope under a well-known
//! field and registers an effect that pulls the declared remote
//! properties into scope fields whenever the context's checksum memo
//! reports an advance.

use crate::context::{EffectHandle, SyncContext};
use crate::remote::RemoteState;
use crate::wire::{RootWire, WireRead};
use std::sync::Arc;

/// Scope field under which a binding installs the root wire, so
/// arbitrary code in the scope can read and write remote state
/// directly, independent of the declared field list.
pub const WIRE_FIELD: &str = "wire";

/// Declares which remote properties a binding pulls, and into which
/// local fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// A list of names pulled into identically named local fields.
    Names(Vec<String>),
    /// Explicit `(local field, remote property)` pairs.
    Mapping(Vec<(String, String)>),
}

impl FieldSpec {
    /// Builds a name-list spec.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Builds an explicit mapping spec.
    pub fn mapping<I, L, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: Into<String>,
    {
        Self::Mapping(
            pairs
                .into_iter()
                .map(|(local, remote)| (local.into(), remote.into()))
                .collect(),
        )
    }

    /// Normalizes the spec into ordered `(local, remote)` pairs: a
    /// name list `[a, b]` behaves exactly like the mapping
    /// `{a: a, b: b}`.
    pub fn normalize(&self) -> Vec<(String, String)> {
        match self {
            Self::Names(names) => names.iter().map(|n| (n.clone(), n.clone())).collect(),
            Self::Mapping(pairs) => pairs.clone(),
        }
    }
}

/// Per-binding modifiers; the binding's configuration surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingModifiers {
    /// Pull through a deferred root wire, so writes through the pulled
    /// nested wires are staged for a later flush instead of sent
    /// immediately.
    pub defer: bool,
}

impl BindingModifiers {
    /// Modifiers with `defer` set.
    pub fn deferred() -> Self {
        Self { defer: true }
    }
}

/// The local reactive scope a binding writes into.
///
/// Assignments are plain local reactive writes: they may trigger local
/// recomputation, but they are never routed back through the remote
/// accessor's `set`, so no feedback loop exists.
pub trait LocalScope: Send + Sync {
    /// Assigns the result of a remote pull to a local field.
    fn assign(&self, field: &str, value: WireRead);

    /// Receives the shared non-deferred root wire; conventionally
    /// stored under [`WIRE_FIELD`].
    fn install_wire(&self, wire: Arc<RootWire>);
}

/// An active binding between a scope and a remote instance.
///
/// The binding stays live for as long as it is held; dropping it
/// detaches the pull effect from the context.
pub struct Binding {
    wire: Arc<RootWire>,
    _effect: EffectHandle,
}

impl Binding {
    /// Returns the shared root wire installed on the scope.
    pub fn wire(&self) -> &Arc<RootWire> {
        &self.wire
    }
}

/// Binds a local scope to a remote instance (the directive
/// registration point, invoked once per bound element).
///
/// Installs the identity-cached root wire on the scope, then registers
/// an effect that on every reconciliation round:
///
/// 1. does nothing if the memo has not advanced (the effect stays
///    registered for the next change);
/// 2. otherwise reads each declared remote property — through a fresh
///    deferred wire when `modifiers.defer` is set, else through the
///    shared wire — and assigns the result to the local field.
///
/// A remote accessor that died mid-round is logged and the field
/// skipped; a dead accessor during teardown must not poison the rest
/// of the pull.
pub fn bind(
    ctx: &SyncContext,
    remote: &Arc<dyn RemoteState>,
    scope: Arc<dyn LocalScope>,
    spec: FieldSpec,
    modifiers: BindingModifiers,
) -> Binding {
    let wire = ctx.wire(remote);
    scope.install_wire(Arc::clone(&wire));

    let pairs = spec.normalize();
    tracing::debug!(fields = pairs.len(), defer = modifiers.defer, "binding created");

    let effect_wire = Arc::clone(&wire);
    let effect = ctx.register_effect(move |ctx| {
        if !ctx.memo().has_advanced() {
            return;
        }

        let deferred;
        let reader: &RootWire = if modifiers.defer {
            deferred = effect_wire.deferred();
            &deferred
        } else {
            effect_wire.as_ref()
        };

        for (local, remote_name) in &pairs {
            match reader.read(remote_name) {
                Ok(value) => scope.assign(local, value),
                Err(err) => {
                    tracing::warn!(field = %remote_name, error = %err, "skipping field pull");
                }
            }
        }
    });

    Binding {
        wire,
        _effect: effect,
    }
}
