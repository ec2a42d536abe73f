//! Property-based tests for the 7-bit payload packing and the dump sniffers.
//!
//! The sniffers' contract is "never panic, never lie": arbitrary byte soup
//! must produce a clean `Option<bool>`, and packed payloads must survive the
//! pack/unpack pair byte-for-byte.

use proptest::prelude::*;

use drumwire_sysex::ids::Category;
use drumwire_sysex::seven_bit::{pack, packed_len, unpack, unpacked_len};
use drumwire_sysex::sniff::fast_empty;

proptest! {
    #[test]
    fn pack_unpack_roundtrip(raw in proptest::collection::vec(any::<u8>(), 0..512)) {
        let packed = pack(&raw);
        prop_assert_eq!(packed.len(), packed_len(raw.len()));
        prop_assert_eq!(unpack(&packed), raw);
    }

    #[test]
    fn packed_bytes_never_set_bit_seven(raw in proptest::collection::vec(any::<u8>(), 0..256)) {
        prop_assert!(pack(&raw).iter().all(|&b| b < 0x80));
    }

    #[test]
    fn unpack_tolerates_arbitrary_input(junk in proptest::collection::vec(any::<u8>(), 0..512)) {
        let out = unpack(&junk);
        prop_assert_eq!(out.len(), unpacked_len(junk.len()));
    }

    #[test]
    fn sniffers_never_panic(junk in proptest::collection::vec(any::<u8>(), 0..4096)) {
        for category in Category::ALL {
            let _ = fast_empty(category, &junk);
        }
    }
}
