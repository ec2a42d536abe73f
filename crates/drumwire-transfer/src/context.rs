//! # Batch context
//!
//! The application shell owns exactly one [`BatchContext`]; everything the
//! transfer engine historically kept in ambient globals — the negotiated
//! turbo factor, pacing configuration, editor selection state, the inbound
//! dispatch gate, and the batch-in-progress flag — lives here and is passed
//! down explicitly.
//!
//! Two pieces of state need save/restore-around semantics and get RAII
//! guards for it: the editor snapshot taken around a Global decode
//! ([`EditorGuard`]) and the inbound dispatch claim held for the duration of
//! a receive batch ([`InboundClaim`]). Both restore on drop, on every exit
//! path.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{PacingConfig, TransferConfig};

// ─── Editor state ───────────────────────────────────────────────────────────

/// Selection and current-buffer indices the editor UI observes. Category
/// decoders may write through this (a dump carries its own position and
/// settings), which is exactly what a bulk receive must shield against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub current_global: u8,
    pub current_kit: u8,
    pub current_pattern: u8,
    pub current_song: u8,
}

impl EditorState {
    /// Snapshot the current values; the guard restores them when dropped,
    /// whether the protected scope succeeded or not.
    pub fn scoped(&mut self) -> EditorGuard<'_> {
        let saved = self.clone();
        EditorGuard {
            target: self,
            saved,
        }
    }
}

/// Drop guard restoring an [`EditorState`] snapshot.
pub struct EditorGuard<'a> {
    target: &'a mut EditorState,
    saved: EditorState,
}

impl Deref for EditorGuard<'_> {
    type Target = EditorState;
    fn deref(&self) -> &EditorState {
        self.target
    }
}

impl DerefMut for EditorGuard<'_> {
    fn deref_mut(&mut self) -> &mut EditorState {
        self.target
    }
}

impl Drop for EditorGuard<'_> {
    fn drop(&mut self) {
        *self.target = self.saved.clone();
    }
}

// ─── Inbound dispatch gate ──────────────────────────────────────────────────

/// Shared flag the inbound SysEx dispatcher consults before running its
/// normal full-decode handling. A receive batch claims the gate so that the
/// batch's own responses are the only consumer of the inbound path.
#[derive(Debug, Default)]
pub struct InboundGate {
    suppressed: AtomicBool,
}

impl InboundGate {
    /// Whether normal inbound handling is currently suppressed.
    pub fn bulk_claimed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }

    /// Atomically claim the gate, remembering the prior state. The claim
    /// restores it on drop.
    pub fn claim(self: &Arc<Self>) -> InboundClaim {
        let prev = self.suppressed.swap(true, Ordering::AcqRel);
        InboundClaim {
            gate: Arc::clone(self),
            prev,
        }
    }
}

/// Drop guard releasing an inbound dispatch claim.
pub struct InboundClaim {
    gate: Arc<InboundGate>,
    prev: bool,
}

impl Drop for InboundClaim {
    fn drop(&mut self) {
        self.gate.suppressed.store(self.prev, Ordering::Release);
    }
}

// ─── Batch context ──────────────────────────────────────────────────────────

/// Process-wide transfer state, owned by the application shell and lent to
/// the orchestrator for the duration of a batch.
#[derive(Debug)]
pub struct BatchContext {
    /// Raw speed multiplier from turbo negotiation; sanitized at the point
    /// of use.
    pub turbo_factor: f64,
    pub pacing: PacingConfig,
    pub editor: EditorState,
    pub inbound: Arc<InboundGate>,
    pub(crate) batch_active: Arc<AtomicBool>,
}

impl BatchContext {
    pub fn new(config: TransferConfig) -> Self {
        BatchContext {
            turbo_factor: 1.0,
            pacing: config.pacing,
            editor: EditorState::default(),
            inbound: Arc::new(InboundGate::default()),
            batch_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a batch currently owns this context.
    pub fn batch_active(&self) -> bool {
        self.batch_active.load(Ordering::Acquire)
    }
}

impl Default for BatchContext {
    fn default() -> Self {
        BatchContext::new(TransferConfig::default())
    }
}
