//! Error types for the wire bridge.

use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while bridging local and remote state.
///
/// The bridge itself defines almost no failure modes: reads and writes
/// are forwarded as-is and remote-side rejection is never surfaced
/// synchronously. What remains is the weak-reference hazard introduced
/// by the identity cache and whatever a remote procedure reports.
#[derive(Error, Debug)]
pub enum WireError {
    /// The remote state accessor behind a wire has been dropped.
    #[error("remote state accessor has been dropped")]
    RemoteGone,

    /// A remote procedure invocation failed.
    #[error("remote procedure `{name}` failed: {message}")]
    Call {
        /// Procedure name.
        name: String,
        /// Failure message reported by the remote service.
        message: String,
    },

    /// The remote service defines no procedure with this name.
    #[error("remote service defines no procedure `{0}`")]
    UnknownProcedure(String),
}

impl WireError {
    /// Creates a procedure failure error.
    pub fn call(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Call {
            name: name.into(),
            message: message.into(),
        }
    }
}
