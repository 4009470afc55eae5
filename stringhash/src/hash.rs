//! Key-to-hash derivation.

use crate::crypt_table::SubstitutionTable;

const SEED1: u32 = 0x7FED_7FED;
const SEED2: u32 = 0xEEEE_EEEE;

/// Selects the substitution row a hash is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HashType {
    /// Picks the starting bucket
    Offset = 0,
    /// First verification tag
    TagA = 1,
    /// Second verification tag
    TagB = 2,
}

/// Hashes `key` with the row selected by `hash_type`.
///
/// Bytes are folded to ASCII upper case first, so keys differing only in
/// ASCII case hash identically. Bytes outside `a..=z` are hashed as-is,
/// including NUL and anything above 0x7F. An empty key yields the initial
/// seed `0x7FED7FED` for every hash type.
pub fn hash_string(table: &SubstitutionTable, key: &[u8], hash_type: HashType) -> u32 {
    let row = hash_type as u32;
    let mut seed1 = SEED1;
    let mut seed2 = SEED2;

    for &byte in key {
        let ch = byte.to_ascii_uppercase();
        seed1 = table.get(row, ch) ^ seed1.wrapping_add(seed2);
        seed2 = (ch as u32)
            .wrapping_add(seed1)
            .wrapping_add(seed2)
            .wrapping_add(seed2 << 5)
            .wrapping_add(3);
    }

    seed1
}

/// The three hashes derived for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHashes {
    pub bucket: u32,
    pub tag_a: u32,
    pub tag_b: u32,
}

impl KeyHashes {
    pub fn derive(table: &SubstitutionTable, key: &[u8]) -> Self {
        Self {
            bucket: hash_string(table, key, HashType::Offset),
            tag_a: hash_string(table, key, HashType::TagA),
            tag_b: hash_string(table, key, HashType::TagB),
        }
    }

    /// Index of the first slot to probe in a table of `capacity` slots.
    #[inline]
    pub fn start(&self, capacity: usize) -> usize {
        self.bucket as usize % capacity
    }

    #[inline]
    pub fn tags(&self) -> (u32, u32) {
        (self.tag_a, self.tag_b)
    }
}
