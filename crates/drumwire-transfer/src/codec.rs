//! # Codec seam
//!
//! The per-category dump grammar lives outside this crate; the scheduler
//! only needs a narrow contract: turn an object into wire bytes, turn wire
//! bytes back into an object, and answer whether a decoded object is the
//! device's notion of "empty".
//!
//! Decoding takes the editor state because some device dumps historically
//! write through to the current edit buffer; the receive loop decides when
//! that effect must be shielded (see the Global snapshot in the worker).

use bytes::Bytes;
use drumwire_sysex::Category;

use crate::context::EditorState;
use crate::error::TransferError;

/// A decoded configuration object with an embedded slot-position field.
pub trait DumpObject: Send {
    /// Stamp the embedded position so the dump lands in the slot we are
    /// writing, regardless of where it was originally fetched from.
    fn set_slot(&mut self, slot: u8);
}

/// Encoder/decoder for one category's dump grammar.
pub trait DumpCodec: Send {
    type Object: DumpObject;

    const CATEGORY: Category;

    /// Serialize to a complete dump message (SysEx framing included).
    fn encode(&self, object: &Self::Object) -> Bytes;

    /// Parse a dump payload. May write through `editor`.
    fn decode(
        &self,
        payload: &[u8],
        editor: &mut EditorState,
    ) -> Result<Self::Object, TransferError>;

    /// Whether a successfully decoded object is trivially empty and should
    /// be committed as an empty slot.
    fn is_empty(&self, object: &Self::Object) -> bool;
}
