//! # Fast-empty dump sniffing
//!
//! Bulk receives spend most of their time decoding dumps that turn out to be
//! factory-blank slots. For kit and pattern dumps a handful of bytes is
//! enough to classify a dump as trivially empty, so the receive loop can
//! commit an empty slot without running the full decoder.
//!
//! The contract is deliberately loose: a sniffer answers `Some(true)`
//! (certainly empty), `Some(false)` (certainly not empty), or `None`
//! (inconclusive — run the real decoder). Sniffers never panic and never
//! error; anything surprising about the buffer is `None`.
//!
//! Global and song dumps have no cheap signal and are always decoded fully.

use tracing::trace;

use crate::ids::{self, Category};
use crate::seven_bit;

// ─── Kit dump layout ────────────────────────────────────────────────────────
//
// header (10) | name (16) | track params (16×24) | track levels (16) |
// machine assignment (16×u32, 7-bit packed → 74) | …
//
// A kit is blank iff no track has a machine assigned: the low 16 bits of
// every assignment word are the machine ID, zero meaning "empty track".

/// Offset of the packed machine-assignment block in a kit dump.
const KIT_ASSIGN_OFF: usize = ids::DUMP_HEADER_LEN + 16 + 16 * 24 + 16;

/// Packed length of 16 big-endian u32 assignment words.
const KIT_ASSIGN_PACKED_LEN: usize = 74;

const KIT_TRACKS: usize = 16;

/// Sniff a kit dump. `Some(true)` iff all 16 machine-assignment words carry
/// a zero machine ID in their low 16 bits.
pub fn kit_fast_empty(payload: &[u8]) -> Option<bool> {
    let block = payload.get(KIT_ASSIGN_OFF..KIT_ASSIGN_OFF + KIT_ASSIGN_PACKED_LEN)?;
    let raw = seven_bit::unpack(block);
    if raw.len() < KIT_TRACKS * 4 {
        return None;
    }
    let empty = raw
        .chunks_exact(4)
        .take(KIT_TRACKS)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .all(|word| word & 0xFFFF == 0);
    Some(empty)
}

// ─── Pattern dump layout ────────────────────────────────────────────────────
//
// Offsets are relative to the marker byte (the pattern dump message ID)
// that starts the tagged sub-message:
//
//   +0   marker            +4    trig block        (74, steps 1–32)
//   +1   version           +78   lock pattern      (74)
//   +2   revision          +152  accent pattern    (74)
//   +3   position          +226  swing pattern     (74)
//                          +300  slide pattern     (74)
//   +374 locked row count  +375  pattern length (steps)
//   +376 tempo multiplier  +377  scale  +378 kit
//   +379 lock row data     (64×32 bytes, packed → 2341)
//   +2720 extended trig block (74, steps 33–64) | …

/// Marker byte opening the tagged pattern sub-message.
const PATTERN_MARKER: u8 = ids::PATTERN_DUMP;

const TRIG_BLOCK_PACKED_LEN: usize = 74;
const FIRST_TRIG_OFF: usize = 4;
const LOCKED_ROWS_OFF: usize = 374;
const PATTERN_LENGTH_OFF: usize = 375;
const EXTRA_TRIG_OFF: usize = 2720;

/// Minimum tagged-section length for the base checks.
const PATTERN_BASE_LEN: usize = PATTERN_LENGTH_OFF + 1;

/// Sniff a pattern dump.
///
/// Empty iff the locked-row count is zero and every restored byte of the
/// relevant trigger block(s) is zero. Patterns longer than 32 steps keep a
/// second trigger block near the tail of the dump; a declared long pattern
/// whose buffer does not reach that block is inconclusive.
pub fn pattern_fast_empty(payload: &[u8]) -> Option<bool> {
    let marker = payload.iter().position(|&b| b == PATTERN_MARKER)?;
    let tagged = payload.get(marker..)?;
    if tagged.len() < PATTERN_BASE_LEN {
        return None;
    }

    let locked_rows = tagged[LOCKED_ROWS_OFF];
    if locked_rows > 0 {
        return Some(false);
    }

    let first = tagged.get(FIRST_TRIG_OFF..FIRST_TRIG_OFF + TRIG_BLOCK_PACKED_LEN)?;
    if seven_bit::unpack(first).iter().any(|&b| b != 0) {
        return Some(false);
    }

    let length = tagged[PATTERN_LENGTH_OFF];
    if length > 32 {
        let Some(extra) = tagged.get(EXTRA_TRIG_OFF..EXTRA_TRIG_OFF + TRIG_BLOCK_PACKED_LEN)
        else {
            trace!(length, "long pattern without extended section, sniff inconclusive");
            return None;
        };
        if seven_bit::unpack(extra).iter().any(|&b| b != 0) {
            return Some(false);
        }
    }

    Some(true)
}

/// Dispatch the category-appropriate sniffer. Categories without a cheap
/// signal always report inconclusive.
pub fn fast_empty(category: Category, payload: &[u8]) -> Option<bool> {
    match category {
        Category::Kit => kit_fast_empty(payload),
        Category::Pattern => pattern_fast_empty(payload),
        Category::Global | Category::Song => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DEVICE_HEADER, KIT_DUMP, SYX_END};
    use crate::seven_bit::pack;

    // ─── Fixtures ───────────────────────────────────────────────────────

    fn kit_frame(words: [u32; 16]) -> Vec<u8> {
        let mut frame = vec![0u8; KIT_ASSIGN_OFF + KIT_ASSIGN_PACKED_LEN + 1];
        frame[..6].copy_from_slice(&DEVICE_HEADER);
        frame[6] = KIT_DUMP;
        frame[7] = 4; // version
        frame[8] = 1; // revision
        frame[9] = 0; // position
        let raw: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        let packed = pack(&raw);
        frame[KIT_ASSIGN_OFF..KIT_ASSIGN_OFF + KIT_ASSIGN_PACKED_LEN]
            .copy_from_slice(&packed);
        *frame.last_mut().unwrap() = SYX_END;
        frame
    }

    fn pattern_frame(
        locked_rows: u8,
        length: u8,
        first_trigs: [u8; 64],
        extra_trigs: Option<[u8; 64]>,
    ) -> Vec<u8> {
        let marker = DEVICE_HEADER.len();
        let body_len = if extra_trigs.is_some() {
            EXTRA_TRIG_OFF + TRIG_BLOCK_PACKED_LEN
        } else {
            PATTERN_BASE_LEN
        };
        let mut frame = vec![0u8; marker + body_len + 1];
        frame[..6].copy_from_slice(&DEVICE_HEADER);
        frame[6] = PATTERN_MARKER;
        frame[marker + LOCKED_ROWS_OFF] = locked_rows;
        frame[marker + PATTERN_LENGTH_OFF] = length;
        let first = pack(&first_trigs);
        frame[marker + FIRST_TRIG_OFF..marker + FIRST_TRIG_OFF + TRIG_BLOCK_PACKED_LEN]
            .copy_from_slice(&first);
        if let Some(extra) = extra_trigs {
            let packed = pack(&extra);
            frame[marker + EXTRA_TRIG_OFF..marker + EXTRA_TRIG_OFF + TRIG_BLOCK_PACKED_LEN]
                .copy_from_slice(&packed);
        }
        *frame.last_mut().unwrap() = SYX_END;
        frame
    }

    // ─── Kit ────────────────────────────────────────────────────────────

    #[test]
    fn kit_all_zero_words_is_empty() {
        assert_eq!(kit_fast_empty(&kit_frame([0; 16])), Some(true));
    }

    #[test]
    fn kit_with_machine_assigned_is_not_empty() {
        let mut words = [0u32; 16];
        words[9] = 0x0003; // machine ID on track 10
        assert_eq!(kit_fast_empty(&kit_frame(words)), Some(false));
    }

    #[test]
    fn kit_flag_bits_above_machine_id_still_empty() {
        // High halves carry routing flags, not assignments.
        let mut words = [0u32; 16];
        words[0] = 0x0001_0000;
        assert_eq!(kit_fast_empty(&kit_frame(words)), Some(true));
    }

    #[test]
    fn kit_short_buffer_is_inconclusive() {
        assert_eq!(kit_fast_empty(&[0u8; 64]), None);
        assert_eq!(kit_fast_empty(&[]), None);
    }

    // ─── Pattern ────────────────────────────────────────────────────────

    #[test]
    fn pattern_blank_short_is_empty() {
        let frame = pattern_frame(0, 16, [0; 64], None);
        assert_eq!(pattern_fast_empty(&frame), Some(true));
    }

    #[test]
    fn pattern_with_locks_is_never_empty() {
        let frame = pattern_frame(1, 16, [0; 64], None);
        assert_eq!(pattern_fast_empty(&frame), Some(false));
    }

    #[test]
    fn pattern_with_trig_in_first_block_is_not_empty() {
        let mut trigs = [0u8; 64];
        trigs[5] = 0x01;
        let frame = pattern_frame(0, 32, trigs, None);
        assert_eq!(pattern_fast_empty(&frame), Some(false));
    }

    #[test]
    fn long_pattern_with_trig_only_in_extended_block_is_not_empty() {
        let mut extra = [0u8; 64];
        extra[40] = 0x80; // restored high bit counts too
        let frame = pattern_frame(0, 64, [0; 64], Some(extra));
        assert_eq!(pattern_fast_empty(&frame), Some(false));
    }

    #[test]
    fn long_pattern_with_blank_extended_block_is_empty() {
        let frame = pattern_frame(0, 64, [0; 64], Some([0; 64]));
        assert_eq!(pattern_fast_empty(&frame), Some(true));
    }

    #[test]
    fn long_pattern_truncated_before_extended_block_is_inconclusive() {
        let frame = pattern_frame(0, 64, [0; 64], None);
        assert_eq!(pattern_fast_empty(&frame), None);
    }

    #[test]
    fn pattern_without_marker_is_inconclusive() {
        assert_eq!(pattern_fast_empty(&[0x00, 0x01, 0x02]), None);
    }

    // ─── Dispatch ───────────────────────────────────────────────────────

    #[test]
    fn global_and_song_always_decode_fully() {
        let buf = vec![0u8; 4096];
        assert_eq!(fast_empty(Category::Global, &buf), None);
        assert_eq!(fast_empty(Category::Song, &buf), None);
    }
}
