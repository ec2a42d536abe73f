//! # 7-bit payload packing
//!
//! SysEx data bytes may not set bit 7, so the device ships 8-bit payload
//! data in groups of up to eight encoded bytes: one header byte whose bits
//! 6..0 carry the missing high bits of the up-to-seven data bytes that
//! follow it. Bit 6 of the header belongs to the first data byte of the
//! group, bit 5 to the second, and so on.
//!
//! ```text
//! raw:    A7 a6..a0 | B7 b6..b0 | …                    (up to 7 bytes)
//! packed: 0 A7 B7 C7 D7 E7 F7 G7 | 0 a6..a0 | 0 b6..b0 | …
//! ```

/// Number of raw bytes carried by one full packed group.
pub const GROUP_RAW_LEN: usize = 7;

/// Number of encoded bytes in one full packed group.
pub const GROUP_PACKED_LEN: usize = 8;

/// Encoded length of `raw_len` bytes of payload.
pub fn packed_len(raw_len: usize) -> usize {
    let full = raw_len / GROUP_RAW_LEN;
    let rem = raw_len % GROUP_RAW_LEN;
    full * GROUP_PACKED_LEN + if rem > 0 { rem + 1 } else { 0 }
}

/// Raw length recovered from `packed_len` encoded bytes.
pub fn unpacked_len(packed_len: usize) -> usize {
    let full = packed_len / GROUP_PACKED_LEN;
    let rem = packed_len % GROUP_PACKED_LEN;
    full * GROUP_RAW_LEN + rem.saturating_sub(1)
}

/// Reconstruct raw payload bytes from a packed slice.
///
/// Tolerates any input: a trailing partial group is decoded as far as it
/// goes, and a lone header byte contributes nothing.
pub fn unpack(packed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(unpacked_len(packed.len()));
    for group in packed.chunks(GROUP_PACKED_LEN) {
        let Some((&head, data)) = group.split_first() else {
            continue;
        };
        for (i, &b) in data.iter().enumerate() {
            let high = (head >> (6 - i)) & 1;
            out.push((b & 0x7F) | (high << 7));
        }
    }
    out
}

/// Encode raw payload bytes into the packed wire form. Inverse of
/// [`unpack`]; used by codec collaborators and test fixtures.
pub fn pack(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(packed_len(raw.len()));
    for chunk in raw.chunks(GROUP_RAW_LEN) {
        let mut head = 0u8;
        for (i, &b) in chunk.iter().enumerate() {
            if b & 0x80 != 0 {
                head |= 1 << (6 - i);
            }
        }
        out.push(head);
        out.extend(chunk.iter().map(|&b| b & 0x7F));
    }
    out
}
