//! Configuration for the sync context.

use crate::memo::SyncMemo;

/// Configuration for a [`crate::SyncContext`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Initial current checksum of the memo.
    pub initial_checksum: String,
    /// Initial previous checksum of the memo.
    pub initial_previous: String,
    /// Key prefix reserved for the local runtime's internals.
    ///
    /// A root read of an absent key under this prefix is reported as
    /// absent instead of being interpreted as a remote procedure.
    pub reserved_prefix: String,
}

impl BridgeConfig {
    /// Creates the default configuration.
    ///
    /// The initial checksums deliberately differ so that the first
    /// reconciliation round pulls initial remote state.
    pub fn new() -> Self {
        Self {
            initial_checksum: "start".into(),
            initial_previous: "none".into(),
            reserved_prefix: "__".into(),
        }
    }

    /// Sets the initial checksum pair.
    pub fn with_initial_checksums(
        mut self,
        current: impl Into<String>,
        previous: impl Into<String>,
    ) -> Self {
        self.initial_checksum = current.into();
        self.initial_previous = previous.into();
        self
    }

    /// Sets the reserved key prefix.
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }

    /// Builds the initial memo for this configuration.
    pub fn initial_memo(&self) -> SyncMemo {
        SyncMemo::new(&self.initial_checksum, &self.initial_previous)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
