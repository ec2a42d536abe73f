//! Per-batch transfer counters, reported in the batch outcome.

/// Counters accumulated across all operations of one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Slots written to the device.
    pub slots_sent: u64,
    /// Slots committed with decoded content.
    pub slots_committed: u64,
    /// Slots committed as empty.
    pub slots_cleared: u64,
    /// Send-loop slots skipped for lack of in-memory data.
    pub slots_skipped: u64,
    /// Slots that errored (and were isolated).
    pub slots_failed: u64,
    /// Receives that skipped full decoding via the fast-empty sniff.
    pub fast_empty_hits: u64,
}

impl BatchStats {
    /// Total slots the batch attempted.
    pub fn attempted(&self) -> u64 {
        self.slots_sent
            + self.slots_committed
            + self.slots_cleared
            + self.slots_skipped
            + self.slots_failed
    }
}
