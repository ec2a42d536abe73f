//! # Category workers
//!
//! One generic send loop and one generic receive loop, instantiated per
//! category through the codec seam. Slots run strictly in order: slot `i+1`
//! never touches the wire before slot `i`'s full wait chain has resolved,
//! matching the device's serial ingestion.
//!
//! Failure policy differs by direction. Receiving is best-effort per slot —
//! a bad dump marks its slot failed and the loop moves on. Sending fails
//! fast out of the loop (the orchestrator isolates at operation level);
//! either way only cancellation ends the batch.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use drumwire_sysex::{ids, sniff, Category};

use crate::clock::{sleep_cancellable, WireClock};
use crate::codec::{DumpCodec, DumpObject};
use crate::config::PacingConfig;
use crate::context::EditorState;
use crate::error::TransferError;
use crate::library::SlotLibrary;
use crate::observer::{SlotStatus, TransferObserver};
use crate::stats::BatchStats;
use crate::transport::Transport;

// ─── Direction & range ──────────────────────────────────────────────────────

/// Which way one operation moves dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Send => "Sending",
            Direction::Receive => "Receiving",
        }
    }
}

/// Inclusive slot range, validated against the category's slot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    start: u8,
    end: u8,
}

impl SlotRange {
    pub fn new(category: Category, start: u8, end: u8) -> Result<Self, TransferError> {
        let count = category.slot_count();
        if start > end || end as usize >= count {
            return Err(TransferError::InvalidRange {
                category,
                start,
                end,
                count,
            });
        }
        Ok(SlotRange { start, end })
    }

    /// Every slot of the category.
    pub fn full(category: Category) -> Self {
        SlotRange {
            start: 0,
            end: (category.slot_count() - 1) as u8,
        }
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    /// Number of slots in the range (inclusive bounds, never zero).
    pub fn count(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<u8> {
        self.start..=self.end
    }
}

// ─── Batch runtime ──────────────────────────────────────────────────────────

/// Everything a worker borrows from the running batch.
pub struct BatchRt<'a> {
    pub transport: &'a mut dyn Transport,
    pub observer: &'a dyn TransferObserver,
    pub clock: &'a mut WireClock,
    pub pacing: &'a PacingConfig,
    pub editor: &'a mut EditorState,
    pub stats: &'a mut BatchStats,
    pub token: CancellationToken,
}

impl BatchRt<'_> {
    /// Cancellable pause between consecutive slots.
    async fn inter_slot_pause(&mut self) -> Result<(), TransferError> {
        let delay = self.pacing.inter_slot_delay(self.clock.turbo_factor());
        sleep_cancellable(delay, &self.token).await
    }
}

// ─── Worker trait ───────────────────────────────────────────────────────────

/// Type-erased handle the orchestrator drives; one per operation, holding
/// the category's codec and a mutable lease on its slot library.
#[async_trait]
pub trait SlotWorker: Send {
    fn category(&self) -> Category;

    async fn run(
        &mut self,
        direction: Direction,
        range: SlotRange,
        rt: &mut BatchRt<'_>,
    ) -> Result<(), TransferError>;
}

/// The generic worker for one category.
pub struct CategoryWorker<'lib, C: DumpCodec> {
    codec: C,
    library: &'lib mut SlotLibrary<C::Object>,
}

impl<'lib, C: DumpCodec> CategoryWorker<'lib, C> {
    pub fn new(codec: C, library: &'lib mut SlotLibrary<C::Object>) -> Self {
        CategoryWorker { codec, library }
    }

    // ─── Send loop ──────────────────────────────────────────────────────

    async fn send_range(
        &mut self,
        range: SlotRange,
        rt: &mut BatchRt<'_>,
    ) -> Result<(), TransferError> {
        let category = C::CATEGORY;
        let label = format!("{} {}", Direction::Send.verb(), category.plural());
        let total = range.count();

        for slot in range.iter() {
            if rt.token.is_cancelled() {
                return Err(TransferError::Cancelled);
            }
            if slot != range.start() {
                rt.inter_slot_pause().await?;
            }
            let attempted = (slot - range.start()) as usize + 1;

            let Some(object) = self.library.get_mut(slot) else {
                // Nothing in memory for this slot; skip, not fatal.
                debug!(%category, slot, "no data for slot, skipping");
                rt.stats.slots_skipped += 1;
                rt.observer.slot_status(category, slot, SlotStatus::Failed);
                rt.observer.progress(&label, attempted, total);
                continue;
            };
            object.set_slot(slot);

            rt.clock.reset();
            let dump = self.codec.encode(object);
            rt.transport.send(&dump)?;
            rt.clock.account_bytes(dump.len());

            let load = ids::load_message(category, slot);
            rt.transport.send(&load)?;
            rt.clock.account_bytes(load.len());

            rt.clock.wait_for_drain(&rt.token).await?;

            rt.stats.slots_sent += 1;
            rt.observer.slot_status(category, slot, SlotStatus::Done);
            rt.observer.progress(&label, attempted, total);
        }
        Ok(())
    }

    // ─── Receive loop ───────────────────────────────────────────────────

    async fn receive_range(
        &mut self,
        range: SlotRange,
        rt: &mut BatchRt<'_>,
    ) -> Result<(), TransferError> {
        let category = C::CATEGORY;
        let label = format!("{} {}", Direction::Receive.verb(), category.plural());
        let total = range.count();

        for slot in range.iter() {
            if rt.token.is_cancelled() {
                return Err(TransferError::Cancelled);
            }
            if slot != range.start() {
                rt.inter_slot_pause().await?;
            }
            let attempted = (slot - range.start()) as usize + 1;

            rt.observer.slot_status(category, slot, SlotStatus::Processing);
            match self.receive_one(slot, rt).await {
                Ok(()) => {
                    rt.observer.slot_status(category, slot, SlotStatus::Done);
                }
                Err(err) if err.is_cancellation() => return Err(err),
                Err(err) => {
                    // Per-slot isolation: flag it and keep going.
                    warn!(%category, slot, error = %err, "slot receive failed, continuing");
                    rt.stats.slots_failed += 1;
                    rt.observer.slot_status(category, slot, SlotStatus::Failed);
                }
            }
            rt.observer.progress(&label, attempted, total);
        }
        Ok(())
    }

    async fn receive_one(&mut self, slot: u8, rt: &mut BatchRt<'_>) -> Result<(), TransferError> {
        let category = C::CATEGORY;
        let payload = rt.transport.request(category, slot, &rt.token).await?;

        if sniff::fast_empty(category, &payload) == Some(true) {
            debug!(%category, slot, "fast-empty hit, decode skipped");
            rt.stats.fast_empty_hits += 1;
            rt.stats.slots_cleared += 1;
            self.library.clear(slot);
            return Ok(());
        }

        let object = if category == Category::Global {
            // A Global dump decode writes through to the editor selection;
            // a bulk receive must only change the slot library.
            let mut shield = rt.editor.scoped();
            self.codec.decode(&payload, &mut shield)?
        } else {
            self.codec.decode(&payload, rt.editor)?
        };

        if self.codec.is_empty(&object) {
            rt.stats.slots_cleared += 1;
            self.library.clear(slot);
        } else {
            rt.stats.slots_committed += 1;
            self.library.commit(slot, object);
        }
        Ok(())
    }
}

#[async_trait]
impl<'lib, C: DumpCodec> SlotWorker for CategoryWorker<'lib, C> {
    fn category(&self) -> Category {
        C::CATEGORY
    }

    async fn run(
        &mut self,
        direction: Direction,
        range: SlotRange,
        rt: &mut BatchRt<'_>,
    ) -> Result<(), TransferError> {
        match direction {
            Direction::Send => self.send_range(range, rt).await,
            Direction::Receive => self.receive_range(range, rt).await,
        }
    }
}
