//! The substitution table feeding the string hash.
//!
//! 0x500 pseudo-random words, five rows of 256, produced by one linear
//! congruential stream walked column by column.

/// Number of words in the table.
pub const TABLE_LEN: usize = 0x500;

/// Number of 256-word rows, one per hash type.
pub const ROWS: usize = TABLE_LEN / 0x100;

const SEED: u32 = 0x0010_0001;
const MODULUS: u32 = 0x2A_AAAB;

#[inline]
fn next_seed(seed: u32) -> u32 {
    // seed < MODULUS, so seed * 125 + 3 stays below 2^29
    (seed * 125 + 3) % MODULUS
}

/// The 1280-entry lookup table, indexed by `(hash_type << 8) + byte`.
///
/// Every instance is identical; it is rebuilt per index rather than shared.
#[derive(Clone, PartialEq, Eq)]
pub struct SubstitutionTable {
    words: Box<[u32; TABLE_LEN]>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        let mut words = Box::new([0u32; TABLE_LEN]);
        let mut seed = SEED;

        // column-major: the seed stream order decides every value
        for column in 0..0x100 {
            for row in 0..ROWS {
                seed = next_seed(seed);
                let high = (seed & 0xFFFF) << 16;
                seed = next_seed(seed);
                let low = seed & 0xFFFF;
                words[column + row * 0x100] = high | low;
            }
        }

        Self { words }
    }

    /// Word for `byte` in the row of `hash_type`.
    ///
    /// # Panics
    ///
    /// Panics if `hash_type` is not below [`ROWS`].
    #[inline]
    pub fn get(&self, hash_type: u32, byte: u8) -> u32 {
        self.words[((hash_type as usize) << 8) + byte as usize]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.words[..]
    }
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubstitutionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionTable")
            .field("len", &TABLE_LEN)
            .field("head", &&self.words[..4])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /// Index-stepping restatement of the stream, used as a reference.
    fn reference_table() -> Vec<u32> {
        let mut out = vec![0u32; TABLE_LEN];
        let mut seed: u64 = 0x0010_0001;
        let mut index1 = 0usize;
        while index1 < 0x100 {
            let mut index2 = index1;
            let mut i = 0;
            while i < 5 {
                seed = (seed * 125 + 3) % 0x2AAAAB;
                let temp1 = (seed & 0xFFFF) << 0x10;
                seed = (seed * 125 + 3) % 0x2AAAAB;
                let temp2 = seed & 0xFFFF;
                out[index2] = (temp1 | temp2) as u32;
                i += 1;
                index2 += 0x100;
            }
            index1 += 1;
        }
        out
    }

    #[test]
    fn test_matches_reference_stream() {
        let table = SubstitutionTable::new();
        assert_eq!(table.as_slice(), reference_table().as_slice());
    }

    #[test]
    fn test_known_words() {
        let table = SubstitutionTable::new();
        assert_eq!(table.get(0, 0), 0x55C6_36E2);
        assert_eq!(table.get(1, 0), 0x76F8_C1B1);
    }

    #[test]
    fn test_deterministic_across_instances() {
        let a = SubstitutionTable::new();
        let b = SubstitutionTable::default();
        assert_eq!(a, b);
        assert_eq!(a.as_slice().len(), TABLE_LEN);
    }

    #[test]
    fn test_column_major_order() {
        // row 1 of column 0 is the second word produced, not the 257th
        let reference = reference_table();
        let table = SubstitutionTable::new();
        assert_eq!(table.get(1, 0), reference[0x100]);
        assert_eq!(table.get(4, 0xFF), reference[0x4FF]);
        assert_ne!(table.get(0, 1), table.get(1, 0));
    }

    #[test]
    fn test_words_are_distinct() {
        let table = SubstitutionTable::new();
        let mut sorted = table.as_slice().to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), TABLE_LEN);
    }
}
