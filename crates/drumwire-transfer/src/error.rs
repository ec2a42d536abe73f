//! # Transfer error taxonomy
//!
//! Only cancellation ever aborts a batch. Everything else is isolated at the
//! smallest sensible scope: per slot in the receive loop, per operation in
//! the orchestrator.

use drumwire_sysex::Category;
use thiserror::Error;

/// Errors surfaced by the transfer core and its collaborator seams.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The batch token fired. Always propagates and ends the batch.
    #[error("transfer cancelled")]
    Cancelled,

    /// A batch was started while another one is running. The second start is
    /// rejected, never queued.
    #[error("another transfer batch is already running")]
    Busy,

    /// Slot range outside the category's slot count.
    #[error("slot range {start}..={end} out of bounds for {category} ({count} slots)")]
    InvalidRange {
        category: Category,
        start: u8,
        end: u8,
        count: usize,
    },

    /// Nothing in memory for the slot. Send-loop skip sentinel, non-fatal.
    #[error("slot {slot} holds no data to send")]
    MissingData { slot: u8 },

    /// The category codec rejected a dump payload.
    #[error("dump decode failed: {0}")]
    Decode(String),

    /// The transport could not move bytes or correlate a response.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl TransferError {
    /// True for errors that must terminate the whole batch.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransferError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancelled_terminates_batches() {
        assert!(TransferError::Cancelled.is_cancellation());
        assert!(!TransferError::Busy.is_cancellation());
        assert!(!TransferError::MissingData { slot: 3 }.is_cancellation());
        assert!(!TransferError::Decode("truncated".into()).is_cancellation());
        assert!(!TransferError::Transport("port gone".into()).is_cancellation());
    }
}
