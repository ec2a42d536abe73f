//! # Wire clock
//!
//! Models transmission time on the serial link instead of trusting the OS
//! driver's buffering: every physical write is accounted at the negotiated
//! bit rate, and the resulting deadline is the earliest instant the device
//! can have drained its input. The scheduler never writes the next slot
//! before the previous slot's deadline (plus a short tail guard) has passed.
//!
//! All waits race against the batch [`CancellationToken`]; a cancelled wait
//! drops its timer immediately and reports [`TransferError::Cancelled`].

use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::TransferError;

// ─── Wire rate ──────────────────────────────────────────────────────────────

/// Serial link bit rate (MIDI).
pub const WIRE_BITS_PER_SEC: f64 = 31_250.0;

/// Framed bits per byte on the wire: 8 data + start + stop.
pub const BITS_PER_BYTE: f64 = 10.0;

/// Clamp an externally negotiated speed multiplier to the model's domain.
/// Absent, non-finite, or sub-unity values mean "no turbo".
pub fn sanitize_turbo(factor: f64) -> f64 {
    if factor.is_finite() && factor >= 1.0 {
        factor
    } else {
        1.0
    }
}

// ─── WireClock ──────────────────────────────────────────────────────────────

/// Transmission deadline model for one batch.
///
/// The deadline only moves forward between [`reset`](WireClock::reset)
/// calls; the workers reset it at the start of each slot's send sequence so
/// drain waits stay per-slot instead of accumulating across the range.
#[derive(Debug)]
pub struct WireClock {
    deadline: Option<Instant>,
    turbo: f64,
}

impl WireClock {
    /// Create a clock for the given negotiated speed multiplier.
    pub fn new(turbo_factor: f64) -> Self {
        WireClock {
            deadline: None,
            turbo: sanitize_turbo(turbo_factor),
        }
    }

    /// Sanitized speed multiplier in effect.
    pub fn turbo_factor(&self) -> f64 {
        self.turbo
    }

    /// Account one physical write of exactly `len` bytes, extending the
    /// deadline by the modeled transmission time. Returns the new deadline.
    pub fn account_bytes(&mut self, len: usize) -> Instant {
        let now = Instant::now();
        let base = match self.deadline {
            Some(d) if d > now => d,
            _ => now,
        };
        let wire_time =
            Duration::from_secs_f64(len as f64 * BITS_PER_BYTE / (WIRE_BITS_PER_SEC * self.turbo));
        let deadline = base + wire_time;
        self.deadline = Some(deadline);
        deadline
    }

    /// Safety margin appended after the modeled drain point. Faster links
    /// need less slack.
    pub fn tail_guard(&self) -> Duration {
        if self.turbo >= 10.0 {
            Duration::from_millis(3)
        } else if self.turbo >= 5.0 {
            Duration::from_millis(6)
        } else {
            Duration::from_millis(12)
        }
    }

    /// Wait until everything accounted so far has drained.
    pub async fn wait_for_drain(&self, token: &CancellationToken) -> Result<(), TransferError> {
        self.wait_for_drain_with(token, Duration::ZERO).await
    }

    /// [`wait_for_drain`](WireClock::wait_for_drain) with extra settle time
    /// on top of the tail guard.
    pub async fn wait_for_drain_with(
        &self,
        token: &CancellationToken,
        extra: Duration,
    ) -> Result<(), TransferError> {
        let now = Instant::now();
        let base = match self.deadline {
            Some(d) if d > now => d,
            _ => now,
        };
        let target = base + self.tail_guard() + extra;
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(TransferError::Cancelled),
            _ = sleep_until(target) => Ok(()),
        }
    }

    /// Forget the current deadline. Called before each slot's send sequence.
    pub fn reset(&mut self) {
        self.deadline = None;
    }
}

// ─── Cancellable delay ──────────────────────────────────────────────────────

/// Sleep that the batch token can interrupt. The pending timer is dropped
/// the moment cancellation wins the race.
pub async fn sleep_cancellable(
    duration: Duration,
    token: &CancellationToken,
) -> Result<(), TransferError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(TransferError::Cancelled),
        _ = sleep(duration) => Ok(()),
    }
}
