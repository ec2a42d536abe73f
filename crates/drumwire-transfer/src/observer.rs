//! # Transfer observer
//!
//! Injected capability for everything the UI wants to know while a batch
//! runs. Production supplies an implementation backed by the slot grid and
//! progress bar widgets; tests supply a recording stub.

use drumwire_sysex::Category;

/// Per-slot lifecycle as shown in the UI grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Request issued, waiting for the device.
    Processing,
    /// Transferred (or confirmed empty) and committed.
    Done,
    /// Skipped or errored; previous contents untouched.
    Failed,
}

/// UI-facing progress callbacks. Implementations must not block.
pub trait TransferObserver: Send + Sync {
    fn slot_status(&self, category: Category, slot: u8, status: SlotStatus);

    /// `current` counts attempted slots (1-based) out of `total` in the
    /// running operation.
    fn progress(&self, label: &str, current: usize, total: usize);

    /// Fired once per batch, only when the batch was not cancelled.
    fn batch_complete(&self) {}
}

/// Observer that ignores everything; for headless and scripted use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl TransferObserver for NullObserver {
    fn slot_status(&self, _category: Category, _slot: u8, _status: SlotStatus) {}
    fn progress(&self, _label: &str, _current: usize, _total: usize) {}
}
