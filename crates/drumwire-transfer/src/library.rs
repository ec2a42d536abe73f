//! # Slot libraries
//!
//! One fixed-size array of decoded objects per category, mirroring the
//! device's slot storage. Slots change only through a successful
//! decode-and-commit or an explicit clear; a failed transfer never touches
//! the previous contents.

use drumwire_sysex::Category;

/// Fixed-size in-memory mirror of one category's device slots.
#[derive(Debug)]
pub struct SlotLibrary<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotLibrary<T> {
    /// Library sized for the category (8/64/128/32 slots).
    pub fn for_category(category: Category) -> Self {
        Self::with_len(category.slot_count())
    }

    pub fn with_len(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        SlotLibrary { slots }
    }

    /// Number of slots; fixed for the library's lifetime.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: u8) -> Option<&T> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: u8) -> Option<&mut T> {
        self.slots.get_mut(slot as usize).and_then(Option::as_mut)
    }

    /// Store a decoded object in a slot.
    pub fn commit(&mut self, slot: u8, object: T) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            *entry = Some(object);
        }
    }

    /// Mark a slot empty.
    pub fn clear(&mut self, slot: u8) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            *entry = None;
        }
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_length_is_fixed_per_category() {
        let lib: SlotLibrary<u32> = SlotLibrary::for_category(Category::Pattern);
        assert_eq!(lib.len(), 128);
        assert_eq!(lib.occupied(), 0);
    }

    #[test]
    fn commit_and_clear_cycle() {
        let mut lib: SlotLibrary<&str> = SlotLibrary::with_len(4);
        lib.commit(2, "snare kit");
        assert_eq!(lib.get(2), Some(&"snare kit"));
        assert_eq!(lib.occupied(), 1);
        lib.clear(2);
        assert_eq!(lib.get(2), None);
        assert_eq!(lib.occupied(), 0);
        assert_eq!(lib.len(), 4);
    }

    #[test]
    fn out_of_range_access_is_inert() {
        let mut lib: SlotLibrary<u8> = SlotLibrary::with_len(2);
        lib.commit(9, 1);
        lib.clear(9);
        assert_eq!(lib.get(9), None);
        assert_eq!(lib.occupied(), 0);
    }
}
