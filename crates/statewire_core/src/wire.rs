//! Wires: path-aware accessors over remote state.
//!
//! A wire is the explicit-API rendering of a transparent property
//! proxy: reads return a [`WireRead`] describing what lives at a key,
//! writes forward to the remote accessor at the composed path. Nested
//! object values are wrapped lazily in fresh [`PropertyWire`]s, which
//! is what makes arbitrarily deep mutation transparent — writing
//! through the wire obtained for `profile` at key `name` issues
//! `set("profile.name", …)` against the accessor.
//!
//! Root wires additionally share one namespace between properties and
//! procedures: a read of a key with no remote value yields a
//! call-forwarding [`RemoteCall`] instead.

use crate::error::{WireError, WireResult};
use crate::path::PropertyPath;
use crate::remote::{RemoteCall, RemoteState};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

/// The outcome of reading one key through a wire.
#[derive(Debug, Clone)]
pub enum WireRead {
    /// A primitive value (null, bool, number, string). Terminates
    /// recursion.
    Value(Value),
    /// An object- or array-valued key, wrapped for nested access.
    Nested(PropertyWire),
    /// No value at this key; at the root this means the name denotes a
    /// remote procedure.
    Procedure(RemoteCall),
    /// No value at this key and no procedure interpretation applies.
    Absent,
}

impl WireRead {
    /// Returns the primitive value, if this read produced one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            WireRead::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the read, returning the primitive value if present.
    pub fn into_value(self) -> Option<Value> {
        match self {
            WireRead::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested wire, if this read hit an object value.
    pub fn as_nested(&self) -> Option<&PropertyWire> {
        match self {
            WireRead::Nested(wire) => Some(wire),
            _ => None,
        }
    }

    /// Returns the call-forwarding handle, if the key resolved to a
    /// procedure.
    pub fn as_procedure(&self) -> Option<&RemoteCall> {
        match self {
            WireRead::Procedure(call) => Some(call),
            _ => None,
        }
    }

    /// Returns true if nothing lives at the key.
    pub fn is_absent(&self) -> bool {
        matches!(self, WireRead::Absent)
    }
}

/// Classifies a remote value: objects and arrays recurse into a fresh
/// property wire, primitives are returned as-is.
fn classify(
    remote: &Weak<dyn RemoteState>,
    path: PropertyPath,
    deferred: bool,
    value: Value,
) -> WireRead {
    match value {
        Value::Object(_) | Value::Array(_) => WireRead::Nested(PropertyWire {
            remote: remote.clone(),
            path,
            deferred,
        }),
        primitive => WireRead::Value(primitive),
    }
}

/// A wire over one non-root path in the remote state tree.
///
/// Property wires are never cached: every nested-object read constructs
/// a fresh instance for the composed path. They hold only a weak
/// reference to the accessor, so a wire parked in some scope field
/// cannot keep a torn-down remote instance alive.
#[derive(Clone)]
pub struct PropertyWire {
    remote: Weak<dyn RemoteState>,
    path: PropertyPath,
    deferred: bool,
}

impl PropertyWire {
    /// Returns the path this wire is anchored at.
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// Returns true if writes through this wire are staged for a later
    /// flush rather than sent immediately.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Fixed role tag for diagnostic tooling. Never consulted by
    /// application logic.
    pub fn tag(&self) -> &'static str {
        "PropertyWire"
    }

    /// Reads the sub-property `key`.
    ///
    /// Object values recurse into a fresh wire carrying the same
    /// deferred flag; primitives are returned directly; an absent key
    /// reads as [`WireRead::Absent`]. There is no consistency check
    /// against the value the parent wire was created from — a path
    /// whose remote value has since changed type simply reflects
    /// whatever the accessor currently returns.
    pub fn get(&self, key: &str) -> WireResult<WireRead> {
        let remote = self.remote.upgrade().ok_or(WireError::RemoteGone)?;
        let path = self.path.child(key);
        tracing::trace!(path = %path, "wire read");
        Ok(match remote.get(&path) {
            Some(value) => classify(&self.remote, path, self.deferred, value),
            None => WireRead::Absent,
        })
    }

    /// Writes the sub-property `key`, forwarding to the accessor at the
    /// composed path with this wire's deferred flag.
    pub fn set(&self, key: &str, value: Value) -> WireResult<()> {
        let remote = self.remote.upgrade().ok_or(WireError::RemoteGone)?;
        let path = self.path.child(key);
        tracing::trace!(path = %path, deferred = self.deferred, "wire write");
        remote.set(&path, value, self.deferred);
        Ok(())
    }
}

impl fmt::Debug for PropertyWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.tag())
            .field("path", &self.path.to_string())
            .field("deferred", &self.deferred)
            .finish()
    }
}

impl fmt::Display for PropertyWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tag(), self.path)
    }
}

/// The top-level wire over one remote instance.
///
/// Non-deferred root wires are handed out by the sync context's
/// identity cache, so repeated wraps of the same accessor return the
/// same `Arc`. Deferred root wires are built fresh on every request and
/// never cached — staged writes from one caller must not be mistaken
/// for another's.
pub struct RootWire {
    remote: Weak<dyn RemoteState>,
    deferred: bool,
    reserved_prefix: Arc<str>,
}

impl RootWire {
    pub(crate) fn new(
        remote: &Arc<dyn RemoteState>,
        deferred: bool,
        reserved_prefix: Arc<str>,
    ) -> Self {
        Self {
            remote: Arc::downgrade(remote),
            deferred,
            reserved_prefix,
        }
    }

    /// Returns true if writes through this wire are staged for a later
    /// flush rather than sent immediately.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Fixed role tag for diagnostic tooling. Never consulted by
    /// application logic.
    pub fn tag(&self) -> &'static str {
        "RootWire"
    }

    /// Returns a fresh deferred root wire over the same accessor.
    ///
    /// This is the opt-in for batched writes: everything read or
    /// written through the returned wire (and wires derived from it)
    /// carries `deferred = true` until an external flush.
    pub fn deferred(&self) -> RootWire {
        RootWire {
            remote: self.remote.clone(),
            deferred: true,
            reserved_prefix: Arc::clone(&self.reserved_prefix),
        }
    }

    /// Reads the top-level key `key`.
    ///
    /// Resolution order: a present object value recurses into a fresh
    /// [`PropertyWire`]; a present primitive is returned directly; an
    /// absent key outside the reserved prefix is interpreted as a
    /// remote procedure and yields a call-forwarding handle; an absent
    /// reserved key reads as [`WireRead::Absent`].
    pub fn read(&self, key: &str) -> WireResult<WireRead> {
        let remote = self.remote.upgrade().ok_or(WireError::RemoteGone)?;
        let path = PropertyPath::root().child(key);
        tracing::trace!(path = %path, "root read");
        Ok(match remote.get(&path) {
            Some(value) => classify(&self.remote, path, self.deferred, value),
            None if !key.starts_with(self.reserved_prefix.as_ref()) => {
                WireRead::Procedure(RemoteCall::new(self.remote.clone(), key))
            }
            None => WireRead::Absent,
        })
    }

    /// Writes the top-level key `key` with this wire's deferred flag.
    pub fn set(&self, key: &str, value: Value) -> WireResult<()> {
        let remote = self.remote.upgrade().ok_or(WireError::RemoteGone)?;
        let path = PropertyPath::root().child(key);
        tracing::trace!(path = %path, deferred = self.deferred, "root write");
        remote.set(&path, value, self.deferred);
        Ok(())
    }
}

impl fmt::Debug for RootWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.tag())
            .field("deferred", &self.deferred)
            .finish()
    }
}

impl fmt::Display for RootWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use serde_json::json;

    fn root_for(remote: &Arc<dyn RemoteState>, deferred: bool) -> RootWire {
        RootWire::new(remote, deferred, Arc::from("__"))
    }

    #[test]
    fn primitive_reads_terminate() {
        let remote = MemoryRemote::with_state(json!({"count": 3, "zero": 0, "empty": ""}));
        let root = root_for(&remote.as_remote(), false);

        assert_eq!(root.read("count").unwrap().into_value(), Some(json!(3)));
        // Falsy primitives are values, never procedures.
        assert_eq!(root.read("zero").unwrap().into_value(), Some(json!(0)));
        assert_eq!(root.read("empty").unwrap().into_value(), Some(json!("")));
    }

    #[test]
    fn path_composition_through_nested_wires() {
        let remote =
            MemoryRemote::with_state(json!({"a": {"b": {"c": 7}}}));
        let root = root_for(&remote.as_remote(), false);

        let a = root.read("a").unwrap();
        let a = a.as_nested().expect("object value wraps in a wire");
        assert_eq!(a.path().to_string(), "a");

        let b = a.get("b").unwrap();
        let b = b.as_nested().unwrap();
        assert_eq!(b.path().to_string(), "a.b");

        assert_eq!(b.get("c").unwrap().into_value(), Some(json!(7)));
    }

    #[test]
    fn nested_write_forwarding() {
        let remote = MemoryRemote::with_state(json!({"profile": {"name": "Ada"}}));
        let root = root_for(&remote.as_remote(), false);

        let profile = root.read("profile").unwrap();
        profile.as_nested().unwrap().set("name", json!("Grace")).unwrap();

        let log = remote.set_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].path, "profile.name");
        assert_eq!(log[0].value, json!("Grace"));
        assert!(!log[0].deferred);
    }

    #[test]
    fn absent_root_key_becomes_procedure() {
        let remote = MemoryRemote::with_state(json!({"count": 1}));
        remote.script_procedure("increment", json!(2));
        let root = root_for(&remote.as_remote(), false);

        let read = root.read("increment").unwrap();
        let call = read.as_procedure().expect("absent key is a procedure");
        assert_eq!(call.invoke(vec![json!(1), json!(2)]).unwrap(), json!(2));

        let log = remote.call_log();
        assert_eq!(log[0].name, "increment");
        assert_eq!(log[0].args, vec![json!(1), json!(2)]);
    }

    #[test]
    fn reserved_prefix_never_forwards() {
        let remote = MemoryRemote::new();
        let root = root_for(&remote.as_remote(), false);

        assert!(root.read("__internal").unwrap().is_absent());
        assert!(remote.call_log().is_empty());
    }

    #[test]
    fn absent_nested_key_is_absent() {
        let remote = MemoryRemote::with_state(json!({"profile": {}}));
        let root = root_for(&remote.as_remote(), false);

        let profile = root.read("profile").unwrap();
        // No procedure interpretation below the root.
        assert!(profile.as_nested().unwrap().get("missing").unwrap().is_absent());
    }

    #[test]
    fn deferred_flag_propagates_through_nesting() {
        let remote = MemoryRemote::with_state(json!({"profile": {"name": "Ada"}}));
        let root = root_for(&remote.as_remote(), false).deferred();
        assert!(root.is_deferred());

        root.set("count", json!(1)).unwrap();
        let profile = root.read("profile").unwrap();
        let profile = profile.as_nested().unwrap();
        assert!(profile.is_deferred());
        profile.set("name", json!("Grace")).unwrap();

        let log = remote.set_log();
        assert!(log.iter().all(|s| s.deferred));
    }

    #[test]
    fn dead_accessor_reads_fail() {
        let remote = MemoryRemote::new();
        let accessor = remote.as_remote();
        let root = root_for(&accessor, false);

        drop(accessor);
        drop(remote);

        assert!(matches!(root.read("x"), Err(WireError::RemoteGone)));
        assert!(matches!(root.set("x", json!(1)), Err(WireError::RemoteGone)));
    }

    #[test]
    fn tags_and_display() {
        let remote = MemoryRemote::with_state(json!({"a": {}}));
        let root = root_for(&remote.as_remote(), false);
        assert_eq!(root.tag(), "RootWire");
        assert_eq!(root.to_string(), "RootWire");

        let nested = root.read("a").unwrap();
        let nested = nested.as_nested().unwrap();
        assert_eq!(nested.tag(), "PropertyWire");
        assert_eq!(nested.to_string(), "PropertyWire(a)");
    }
}
