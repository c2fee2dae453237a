//! Remote state accessor boundary.
//!
//! The remote service is consumed through the [`RemoteState`] trait:
//! synchronous reads of locally cached server state, immediate or
//! deferred writes, and named procedure invocation. The bridge never
//! interprets or retries remote failures; they propagate untouched.

use crate::context::SyncContext;
use crate::error::{WireError, WireResult};
use crate::path::PropertyPath;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// Accessor for one remote-service instance.
///
/// Identity matters: the accessor's `Arc` allocation is the key of the
/// wire identity cache, so one accessor should be created per remote
/// instance and shared from there.
pub trait RemoteState: Send + Sync {
    /// Looks up the current known value at `path`.
    ///
    /// Never blocks on the network; implementations read their locally
    /// cached copy of server state. `None` means the path is absent,
    /// which is distinct from a present `Value::Null`.
    fn get(&self, path: &PropertyPath) -> Option<Value>;

    /// Records an intended write at `path`.
    ///
    /// With `deferred = false` the write triggers or queues an outbound
    /// round trip; with `deferred = true` it is only staged for a later
    /// explicit flush. Staging is total: remote-side rejection is never
    /// surfaced synchronously.
    fn set(&self, path: &PropertyPath, value: Value, deferred: bool);

    /// Invokes a named remote procedure, triggering a round trip.
    fn call(&self, name: &str, args: Vec<Value>) -> WireResult<Value>;
}

/// A call-forwarding handle for a remote procedure.
///
/// Produced by a root wire read of a key that has no remote value:
/// absence of state at a name is interpreted as "this is a procedure,
/// not a property", so procedures and properties share one namespace.
#[derive(Clone)]
pub struct RemoteCall {
    remote: Weak<dyn RemoteState>,
    name: String,
}

impl RemoteCall {
    pub(crate) fn new(remote: Weak<dyn RemoteState>, name: impl Into<String>) -> Self {
        Self {
            remote,
            name: name.into(),
        }
    }

    /// Returns the procedure name this handle forwards to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the remote procedure with the given arguments.
    pub fn invoke(&self, args: Vec<Value>) -> WireResult<Value> {
        let remote = self.remote.upgrade().ok_or(WireError::RemoteGone)?;
        tracing::trace!(procedure = %self.name, argc = args.len(), "forwarding call");
        remote.call(&self.name, args)
    }
}

impl fmt::Debug for RemoteCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCall").field("name", &self.name).finish()
    }
}

/// A record of one `set` forwarded to a [`MemoryRemote`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetRecord {
    /// Dot-joined path of the write.
    pub path: String,
    /// Written value.
    pub value: Value,
    /// Whether the write was staged for a later flush.
    pub deferred: bool,
}

/// A record of one procedure call forwarded to a [`MemoryRemote`].
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    /// Procedure name.
    pub name: String,
    /// Call arguments.
    pub args: Vec<Value>,
}

/// A scriptable in-memory remote service for testing.
///
/// Holds server state as a JSON tree addressed by dot paths, applies
/// and logs every write (deferred writes update local state too, as a
/// real service stages them client-side), and answers procedure calls
/// from a scripted result table.
pub struct MemoryRemote {
    state: RwLock<Value>,
    sets: Mutex<Vec<SetRecord>>,
    calls: Mutex<Vec<CallRecord>>,
    procedures: Mutex<HashMap<String, Value>>,
}

impl MemoryRemote {
    /// Creates a remote with an empty object as its state tree.
    pub fn new() -> Arc<Self> {
        Self::with_state(Value::Object(serde_json::Map::new()))
    }

    /// Creates a remote with the given initial state tree.
    pub fn with_state(state: Value) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(state),
            sets: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            procedures: Mutex::new(HashMap::new()),
        })
    }

    /// Returns this remote as a shared [`RemoteState`] accessor.
    ///
    /// The returned `Arc` shares the allocation of `self`, so repeated
    /// conversions keep the same cache identity.
    pub fn as_remote(self: &Arc<Self>) -> Arc<dyn RemoteState> {
        Arc::clone(self) as Arc<dyn RemoteState>
    }

    /// Scripts the result of a named procedure.
    pub fn script_procedure(&self, name: impl Into<String>, result: Value) {
        self.procedures.lock().insert(name.into(), result);
    }

    /// Returns a snapshot of the state tree.
    pub fn state(&self) -> Value {
        self.state.read().clone()
    }

    /// Returns all recorded writes in order.
    pub fn set_log(&self) -> Vec<SetRecord> {
        self.sets.lock().clone()
    }

    /// Returns only the writes staged as deferred.
    pub fn deferred_sets(&self) -> Vec<SetRecord> {
        self.sets.lock().iter().filter(|s| s.deferred).cloned().collect()
    }

    /// Returns all recorded procedure calls in order.
    pub fn call_log(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    /// Simulates a completed round trip: the server's state has
    /// advanced to `checksum`, which is reported to the context hook.
    pub fn complete_round_trip(&self, ctx: &SyncContext, checksum: &str) {
        ctx.record_round_trip(checksum);
    }
}

impl RemoteState for MemoryRemote {
    fn get(&self, path: &PropertyPath) -> Option<Value> {
        lookup(&self.state.read(), path).cloned()
    }

    fn set(&self, path: &PropertyPath, value: Value, deferred: bool) {
        self.sets.lock().push(SetRecord {
            path: path.to_string(),
            value: value.clone(),
            deferred,
        });
        store(&mut self.state.write(), path, value);
    }

    fn call(&self, name: &str, args: Vec<Value>) -> WireResult<Value> {
        self.calls.lock().push(CallRecord {
            name: name.to_string(),
            args,
        });
        self.procedures
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| WireError::UnknownProcedure(name.to_string()))
    }
}

/// Navigates a JSON tree along a path. Arrays are addressed by numeric
/// string segments.
fn lookup<'a>(root: &'a Value, path: &PropertyPath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Stores a value at a path, creating intermediate objects as needed.
fn store(root: &mut Value, path: &PropertyPath, value: Value) {
    let mut node = root;
    let mut segments = path.segments().peekable();
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        match node {
            Value::Array(items) => {
                let Some(index) = segment.parse::<usize>().ok().filter(|i| *i < items.len())
                else {
                    return;
                };
                if last {
                    items[index] = value;
                    return;
                }
                node = &mut items[index];
            }
            other => {
                // Non-object intermediates are replaced; the remote tree
                // is object-shaped at every written prefix.
                if !other.is_object() {
                    *other = Value::Object(serde_json::Map::new());
                }
                let map = other.as_object_mut().expect("just ensured object");
                if last {
                    map.insert(segment.to_string(), value);
                    return;
                }
                node = map
                    .entry(segment.to_string())
                    .or_insert(Value::Object(serde_json::Map::new()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_navigates_objects_and_arrays() {
        let remote = MemoryRemote::with_state(json!({
            "name": "Ada",
            "address": {"city": "London"},
            "tags": ["a", "b"],
        }));

        assert_eq!(remote.get(&"name".into()), Some(json!("Ada")));
        assert_eq!(remote.get(&"address.city".into()), Some(json!("London")));
        assert_eq!(remote.get(&"tags.1".into()), Some(json!("b")));
        assert_eq!(remote.get(&"missing".into()), None);
        assert_eq!(remote.get(&"address.zip".into()), None);
    }

    #[test]
    fn absent_is_distinct_from_null() {
        let remote = MemoryRemote::with_state(json!({"middle_name": null}));
        assert_eq!(remote.get(&"middle_name".into()), Some(Value::Null));
        assert_eq!(remote.get(&"last_name".into()), None);
    }

    #[test]
    fn set_applies_and_logs() {
        let remote = MemoryRemote::with_state(json!({"profile": {"name": "Ada"}}));

        remote.set(&"profile.name".into(), json!("Grace"), false);
        remote.set(&"profile.title".into(), json!("Rear Admiral"), true);

        assert_eq!(remote.get(&"profile.name".into()), Some(json!("Grace")));
        assert_eq!(
            remote.get(&"profile.title".into()),
            Some(json!("Rear Admiral"))
        );

        let log = remote.set_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].path, "profile.name");
        assert!(!log[0].deferred);
        assert_eq!(remote.deferred_sets().len(), 1);
        assert_eq!(remote.deferred_sets()[0].path, "profile.title");
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let remote = MemoryRemote::new();
        remote.set(&"a.b.c".into(), json!(1), false);
        assert_eq!(remote.get(&"a.b.c".into()), Some(json!(1)));
    }

    #[test]
    fn scripted_procedures() {
        let remote = MemoryRemote::new();
        remote.script_procedure("increment", json!(5));

        let result = remote.call("increment", vec![json!(1), json!(2)]).unwrap();
        assert_eq!(result, json!(5));

        let log = remote.call_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].name, "increment");
        assert_eq!(log[0].args, vec![json!(1), json!(2)]);

        assert!(matches!(
            remote.call("unknown", vec![]),
            Err(WireError::UnknownProcedure(_))
        ));
    }

    #[test]
    fn remote_call_handle_forwards() {
        let remote = MemoryRemote::new();
        remote.script_procedure("ping", json!("pong"));
        let accessor = remote.as_remote();

        let handle = RemoteCall::new(Arc::downgrade(&accessor), "ping");
        assert_eq!(handle.name(), "ping");
        assert_eq!(handle.invoke(vec![]).unwrap(), json!("pong"));

        drop(accessor);
        drop(remote);
        assert!(matches!(handle.invoke(vec![]), Err(WireError::RemoteGone)));
    }
}
