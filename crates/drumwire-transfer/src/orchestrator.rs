//! # Transfer orchestrator
//!
//! Drives one batch: an ordered list of per-category operations, executed
//! strictly sequentially over a single cancellation token. The orchestrator
//! owns the cross-operation policy — exclusive inbound dispatch during
//! receive batches, operation-level error isolation, and the
//! completion callback contract.

use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use drumwire_sysex::Category;

use crate::clock::WireClock;
use crate::codec::DumpCodec;
use crate::context::{BatchContext, InboundClaim};
use crate::error::TransferError;
use crate::library::SlotLibrary;
use crate::observer::TransferObserver;
use crate::stats::BatchStats;
use crate::transport::Transport;
use crate::worker::{BatchRt, CategoryWorker, Direction, SlotRange, SlotWorker};

// ─── Operation ──────────────────────────────────────────────────────────────

/// One category's share of a batch: a direction, a slot range, and the
/// worker that leases the category's library for the batch's lifetime.
/// Immutable once the batch starts.
pub struct Operation<'lib> {
    category: Category,
    direction: Direction,
    range: SlotRange,
    worker: Box<dyn SlotWorker + 'lib>,
}

impl<'lib> Operation<'lib> {
    pub fn new(
        direction: Direction,
        range: SlotRange,
        worker: Box<dyn SlotWorker + 'lib>,
    ) -> Self {
        Operation {
            category: worker.category(),
            direction,
            range,
            worker,
        }
    }

    /// Send `range` of a category from its library to the device.
    pub fn send<C>(codec: C, library: &'lib mut SlotLibrary<C::Object>, range: SlotRange) -> Self
    where
        C: DumpCodec + 'lib,
    {
        Self::new(
            Direction::Send,
            range,
            Box::new(CategoryWorker::new(codec, library)),
        )
    }

    /// Pull `range` of a category from the device into its library.
    pub fn receive<C>(codec: C, library: &'lib mut SlotLibrary<C::Object>, range: SlotRange) -> Self
    where
        C: DumpCodec + 'lib,
    {
        Self::new(
            Direction::Receive,
            range,
            Box::new(CategoryWorker::new(codec, library)),
        )
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn range(&self) -> SlotRange {
        self.range
    }
}

/// Clears the context's batch-in-progress flag on every exit path, even if
/// the batch future is dropped instead of cancelled.
struct BatchFlagGuard {
    flag: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl Drop for BatchFlagGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ─── Session ────────────────────────────────────────────────────────────────

/// Per-batch lifecycle state. Holding the inbound claim here means it is
/// released on every exit path, including cancellation and early errors.
struct TransferSession {
    token: CancellationToken,
    is_receive: bool,
    _inbound: Option<InboundClaim>,
}

impl TransferSession {
    fn open(ctx: &BatchContext, token: CancellationToken, is_receive: bool) -> Self {
        let _inbound = is_receive.then(|| ctx.inbound.claim());
        TransferSession {
            token,
            is_receive,
            _inbound,
        }
    }
}

// ─── Outcome ────────────────────────────────────────────────────────────────

/// What happened to a batch that was allowed to start.
#[derive(Debug, Clone, Copy)]
pub struct BatchOutcome {
    /// The batch stopped early on its cancellation token. Slots completed
    /// before the cancel stay committed.
    pub cancelled: bool,
    pub stats: BatchStats,
}

// ─── Orchestrator ───────────────────────────────────────────────────────────

/// Runs batches against one device link. Only one batch may be in flight
/// process-wide; the [`BatchContext`] flag enforces it across callers.
pub struct TransferOrchestrator<T: Transport, O: TransferObserver> {
    transport: T,
    observer: O,
}

impl<T: Transport, O: TransferObserver> TransferOrchestrator<T, O> {
    pub fn new(transport: T, observer: O) -> Self {
        TransferOrchestrator {
            transport,
            observer,
        }
    }

    /// Run one batch to completion, cancellation, or rejection.
    ///
    /// A second start while a batch is active returns
    /// [`TransferError::Busy`] — start requests are never queued. All other
    /// worker errors are absorbed per operation; the returned outcome's
    /// `cancelled` flag is the only early-exit signal.
    pub async fn run_batch(
        &mut self,
        ctx: &mut BatchContext,
        operations: Vec<Operation<'_>>,
        token: &CancellationToken,
    ) -> Result<BatchOutcome, TransferError> {
        if ctx.batch_active.swap(true, Ordering::AcqRel) {
            warn!("rejecting batch start, another batch is active");
            return Err(TransferError::Busy);
        }
        let _active = BatchFlagGuard {
            flag: ctx.batch_active.clone(),
        };
        Ok(self.drive(ctx, operations, token).await)
    }

    async fn drive(
        &mut self,
        ctx: &mut BatchContext,
        operations: Vec<Operation<'_>>,
        token: &CancellationToken,
    ) -> BatchOutcome {
        let is_receive = operations
            .iter()
            .any(|op| op.direction == Direction::Receive);
        let session = TransferSession::open(ctx, token.clone(), is_receive);
        let mut clock = WireClock::new(ctx.turbo_factor);
        let mut stats = BatchStats::default();
        let mut cancelled = session.token.is_cancelled();

        debug!(
            operations = operations.len(),
            receive = session.is_receive,
            turbo = clock.turbo_factor(),
            "batch starting"
        );

        for mut op in operations {
            if session.token.is_cancelled() {
                cancelled = true;
                break;
            }
            let mut rt = BatchRt {
                transport: &mut self.transport,
                observer: &self.observer,
                clock: &mut clock,
                pacing: &ctx.pacing,
                editor: &mut ctx.editor,
                stats: &mut stats,
                token: session.token.clone(),
            };
            match op.worker.run(op.direction, op.range, &mut rt).await {
                Ok(()) => {}
                Err(err) if err.is_cancellation() => {
                    debug!(category = %op.category, "batch cancelled");
                    cancelled = true;
                    break;
                }
                Err(err) => {
                    // Operation-level isolation: log and move to the next
                    // category.
                    warn!(category = %op.category, error = %err, "operation failed, continuing batch");
                }
            }
        }

        // Release the inbound claim before the completion callback so UI
        // refresh already sees normal dispatch.
        drop(session);
        if !cancelled {
            self.observer.batch_complete();
        }
        debug!(cancelled, attempted = stats.attempted(), "batch finished");
        BatchOutcome { cancelled, stats }
    }
}
