//! # Message identifiers and command frames
//!
//! Every dump message shares the same shape:
//!
//! ```text
//! F0 00 20 3C 02 00 | id | version | revision | position | payload… | F7
//! ```
//!
//! The six-byte vendor preamble and the one-byte message ID are fixed; the
//! three header bytes after the ID are common to all four dump categories.
//! Short command frames (request, load) carry a single slot byte instead of
//! a payload.

use std::fmt;

// ─── Frame constants ────────────────────────────────────────────────────────

/// SysEx start byte.
pub const SYX_START: u8 = 0xF0;

/// SysEx end byte.
pub const SYX_END: u8 = 0xF7;

/// Vendor/device preamble preceding every message ID.
pub const DEVICE_HEADER: [u8; 6] = [SYX_START, 0x00, 0x20, 0x3C, 0x02, 0x00];

/// Offset of the first payload byte in a dump message: preamble (6) +
/// message ID + version + revision + position.
pub const DUMP_HEADER_LEN: usize = 10;

/// Offset of the slot-position byte within a dump message.
pub const DUMP_POSITION_OFF: usize = 9;

// ─── Message IDs ────────────────────────────────────────────────────────────

pub const GLOBAL_DUMP: u8 = 0x50;
pub const GLOBAL_REQUEST: u8 = 0x51;
pub const KIT_DUMP: u8 = 0x52;
pub const KIT_REQUEST: u8 = 0x53;
pub const LOAD_GLOBAL: u8 = 0x56;
pub const LOAD_PATTERN: u8 = 0x57;
pub const LOAD_KIT: u8 = 0x58;
pub const PATTERN_DUMP: u8 = 0x67;
pub const PATTERN_REQUEST: u8 = 0x68;
pub const SONG_DUMP: u8 = 0x69;
pub const SONG_REQUEST: u8 = 0x6A;
pub const LOAD_SONG: u8 = 0x6C;

// ─── Category ───────────────────────────────────────────────────────────────

/// The four transferable configuration object categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Global,
    Kit,
    Pattern,
    Song,
}

impl Category {
    /// All categories in device display order.
    pub const ALL: [Category; 4] = [
        Category::Global,
        Category::Kit,
        Category::Pattern,
        Category::Song,
    ];

    /// Number of device slots for this category.
    pub fn slot_count(self) -> usize {
        match self {
            Category::Global => 8,
            Category::Kit => 64,
            Category::Pattern => 128,
            Category::Song => 32,
        }
    }

    /// Dump message ID the device answers requests with.
    pub fn dump_id(self) -> u8 {
        match self {
            Category::Global => GLOBAL_DUMP,
            Category::Kit => KIT_DUMP,
            Category::Pattern => PATTERN_DUMP,
            Category::Song => SONG_DUMP,
        }
    }

    /// Request message ID for pulling a slot.
    pub fn request_id(self) -> u8 {
        match self {
            Category::Global => GLOBAL_REQUEST,
            Category::Kit => KIT_REQUEST,
            Category::Pattern => PATTERN_REQUEST,
            Category::Song => SONG_REQUEST,
        }
    }

    /// Command ID that makes the device load a just-written slot.
    pub fn load_id(self) -> u8 {
        match self {
            Category::Global => LOAD_GLOBAL,
            Category::Kit => LOAD_KIT,
            Category::Pattern => LOAD_PATTERN,
            Category::Song => LOAD_SONG,
        }
    }

    /// Whether a cheap emptiness sniff exists for this category's dumps.
    pub fn supports_fast_empty(self) -> bool {
        matches!(self, Category::Kit | Category::Pattern)
    }

    /// Plural noun for user-facing progress labels.
    pub fn plural(self) -> &'static str {
        match self {
            Category::Global => "global slots",
            Category::Kit => "kits",
            Category::Pattern => "patterns",
            Category::Song => "songs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Global => "global",
            Category::Kit => "kit",
            Category::Pattern => "pattern",
            Category::Song => "song",
        };
        f.write_str(name)
    }
}

// ─── Command frames ─────────────────────────────────────────────────────────

fn command_frame(id: u8, slot: u8) -> [u8; 9] {
    let mut frame = [0u8; 9];
    frame[..6].copy_from_slice(&DEVICE_HEADER);
    frame[6] = id;
    frame[7] = slot & 0x7F;
    frame[8] = SYX_END;
    frame
}

/// Build the short "load slot" command sent after a dump write.
pub fn load_message(category: Category, slot: u8) -> [u8; 9] {
    command_frame(category.load_id(), slot)
}

/// Build the dump request frame for a slot.
pub fn request_message(category: Category, slot: u8) -> [u8; 9] {
    command_frame(category.request_id(), slot)
}
