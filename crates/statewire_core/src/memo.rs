//! Checksum memo for remote-change detection.
//!
//! The remote service reports an opaque checksum string after every
//! completed round trip. The memo keeps the current and the previously
//! reconciled checksum; a binding pulls remote fields exactly when the
//! two differ. Checksums are compared only for equality, never for
//! ordering.

/// Record of the remote state revision as seen by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMemo {
    current: String,
    previous: String,
}

impl SyncMemo {
    /// Creates a memo with explicit initial checksums.
    ///
    /// The two should differ so that the first round of bindings pulls
    /// initial remote state; [`crate::BridgeConfig`] defaults them to
    /// `"start"` / `"none"`.
    pub fn new(current: impl Into<String>, previous: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            previous: previous.into(),
        }
    }

    /// Returns the checksum of the latest completed round trip.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Returns the last reconciled checksum.
    pub fn previous(&self) -> &str {
        &self.previous
    }

    /// Returns true if the remote state has advanced since the last
    /// reconciliation, i.e. the two checksums differ.
    pub fn has_advanced(&self) -> bool {
        self.current != self.previous
    }

    /// Records the checksum of a newly completed round trip.
    ///
    /// The prior current value becomes the previous one, so the memo
    /// reports an advance for exactly one reconciliation round.
    pub fn record(&mut self, checksum: impl Into<String>) {
        self.previous = std::mem::replace(&mut self.current, checksum.into());
    }

    /// Reconciles the memo: the current checksum becomes the previous
    /// one, so [`SyncMemo::has_advanced`] returns false until the next
    /// genuine round trip.
    pub fn mark_seen(&mut self) {
        self.previous = self.current.clone();
    }
}

impl Default for SyncMemo {
    fn default() -> Self {
        crate::config::BridgeConfig::default().initial_memo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_memo_has_advanced() {
        let memo = SyncMemo::default();
        assert_eq!(memo.current(), "start");
        assert_eq!(memo.previous(), "none");
        assert!(memo.has_advanced());
    }

    #[test]
    fn record_then_mark_seen() {
        let mut memo = SyncMemo::new("start", "none");

        memo.record("c1");
        assert_eq!(memo.current(), "c1");
        assert_eq!(memo.previous(), "start");
        assert!(memo.has_advanced());

        memo.mark_seen();
        assert_eq!(memo.previous(), "c1");
        assert!(!memo.has_advanced());

        memo.record("c2");
        assert_eq!(memo.current(), "c2");
        assert_eq!(memo.previous(), "c1");
        assert!(memo.has_advanced());
    }

    #[test]
    fn same_checksum_still_advances_once() {
        // A round trip that reports the same checksum twice in a row
        // looks quiescent after reconciliation.
        let mut memo = SyncMemo::new("c1", "c1");
        assert!(!memo.has_advanced());

        memo.record("c1");
        assert!(!memo.has_advanced());
    }
}
