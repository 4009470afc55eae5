use bytemuck::{Pod, Zeroable};
use modular_bitfield::prelude::B7;
use modular_bitfield::{Specifier, bitfield};

#[derive(Specifier, Debug, Clone, Copy, PartialEq, Eq)]
#[bits = 1]
pub enum SlotState {
    Empty,
    Occupied,
}

/// One packed 9-byte table entry.
///
/// An all-zero slot is empty, so a zeroed byte store is a valid empty table.
#[bitfield(bits = 72)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable, Pod)]
#[repr(C)]
pub struct Slot {
    #[bits = 1]
    state: SlotState,
    #[skip]
    __: B7,
    tag_a: u32,
    tag_b: u32,
}

impl Slot {
    pub fn occupied_with(tag_a: u32, tag_b: u32) -> Self {
        Slot::new()
            .with_state(SlotState::Occupied)
            .with_tag_a(tag_a)
            .with_tag_b(tag_b)
    }

    pub fn is_occupied(&self) -> bool {
        self.state() == SlotState::Occupied
    }

    pub fn is_empty(&self) -> bool {
        self.state() == SlotState::Empty
    }

    /// The stored verification tags, `None` while the slot is empty.
    pub fn tags(&self) -> Option<(u32, u32)> {
        self.is_occupied().then(|| (self.tag_a(), self.tag_b()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_slot_is_empty() {
        let slot = Slot::zeroed();
        assert!(slot.is_empty());
        assert_eq!(slot.tags(), None);
        assert_eq!(std::mem::size_of::<Slot>(), 9);
    }

    #[test]
    fn test_occupied_keeps_tags() {
        // all-ones tags are valid, there is no sentinel value
        let slot = Slot::occupied_with(u32::MAX, 0);
        assert!(slot.is_occupied());
        assert_eq!(slot.tags(), Some((u32::MAX, 0)));
    }

    #[test]
    fn test_bytes_round_trip() {
        let slot = Slot::occupied_with(0xDEAD_BEEF, 0x0BAD_F00D);
        let bytes = bytemuck::bytes_of(&slot).to_vec();
        let back: &Slot = bytemuck::from_bytes(&bytes);
        assert_eq!(back.tags(), Some((0xDEAD_BEEF, 0x0BAD_F00D)));
    }
}
