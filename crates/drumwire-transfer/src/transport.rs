//! # Transport seam
//!
//! The device connection — port discovery, SysEx framing on the input
//! callback, request/response correlation, and timeouts — is owned by the
//! MIDI layer. The scheduler sees two operations: fire bytes at the wire,
//! and ask for one slot's dump.

use async_trait::async_trait;
use bytes::Bytes;
use drumwire_sysex::Category;
use tokio_util::sync::CancellationToken;

use crate::error::TransferError;

/// Device link as seen by the transfer workers.
#[async_trait]
pub trait Transport: Send {
    /// Write one complete message to the wire. Returns as soon as the bytes
    /// are handed to the driver; modeled transmission time is the
    /// [`WireClock`](crate::clock::WireClock)'s job.
    fn send(&mut self, frame: &[u8]) -> Result<(), TransferError>;

    /// Request one slot's dump and await the correlated response. Timeout
    /// policy lives behind this call; cancellation must surface as
    /// [`TransferError::Cancelled`].
    async fn request(
        &mut self,
        category: Category,
        slot: u8,
        token: &CancellationToken,
    ) -> Result<Bytes, TransferError>;
}
