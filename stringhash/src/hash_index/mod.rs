use crate::byte_store::{ByteStore, zeroed_boxed};
use crate::crypt_table::SubstitutionTable;
use crate::error::{HashIndexError, Result};
use crate::fixed_buffers::FixedVec;
use crate::hash::KeyHashes;

pub mod slot;

pub use slot::{Slot, SlotState};

/// Number of slots used by [`HashIndex::default`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Size in bytes of one slot in the backing store.
pub const SLOT_SIZE: usize = std::mem::size_of::<Slot>();

/// A fixed-capacity, append-only index from case-insensitive byte strings to
/// slot positions.
///
/// Keys are never stored. Each key is reduced to three hashes drawn from a
/// [`SubstitutionTable`]: one picks the starting slot, the other two are kept
/// in the slot as verification tags. Collisions on the starting slot are
/// resolved by linear probing, wrapping at the end of the table.
///
/// There is no removal and no resizing: once every slot is occupied, inserts
/// fail with [`HashIndexError::TableFull`]. Two keys are only told apart by
/// their tags, so inserting the same key twice takes two slots.
///
/// The slots live in a `ByteStore`; [`HashIndex::new`] allocates a boxed
/// slice, [`HashIndex::with_store`] takes caller-provided memory.
pub struct HashIndex<S: ByteStore = Box<[u8]>> {
    slots: FixedVec<Slot, S>,
    table: SubstitutionTable,
    capacity: usize,
    size: usize,
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::build(FixedVec::new(zeroed_boxed(DEFAULT_CAPACITY * SLOT_SIZE)))
    }
}

impl HashIndex {
    /// Creates an index with `capacity` empty slots.
    ///
    /// Fails with [`HashIndexError::InvalidCapacity`] if `capacity` is zero or
    /// the slot array would not fit in memory.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HashIndexError::InvalidCapacity(capacity));
        }
        let bytes = capacity
            .checked_mul(SLOT_SIZE)
            .filter(|bytes| *bytes <= isize::MAX as usize)
            .ok_or(HashIndexError::InvalidCapacity(capacity))?;

        Ok(Self::build(FixedVec::new(zeroed_boxed(bytes))))
    }
}

impl<S: ByteStore> HashIndex<S> {
    /// Creates an index over `store`, using as many slots as fit in it.
    ///
    /// The store is zeroed first, whatever it held before. A store too small
    /// for a single slot is rejected.
    pub fn with_store(mut store: S) -> Result<Self> {
        store.reset();
        let slots = FixedVec::new(store);
        if slots.is_empty() {
            return Err(HashIndexError::InvalidCapacity(0));
        }
        Ok(Self::build(slots))
    }

    fn build(slots: FixedVec<Slot, S>) -> Self {
        let table = SubstitutionTable::new();
        let capacity = slots.len();
        log::trace!("Created hash index with {capacity} slots");

        Self {
            slots,
            table,
            capacity,
            size: 0,
        }
    }

    /// Returns the number of occupied slots
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if no key has been inserted
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns true once every slot is occupied; further inserts fail
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    /// Returns the fixed number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the load factor of the index (len / capacity)
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.capacity as f64
    }

    pub fn substitution_table(&self) -> &SubstitutionTable {
        &self.table
    }

    /// Derives the bucket hash and both tags for `key`.
    pub fn hashes<K: AsRef<[u8]>>(&self, key: K) -> KeyHashes {
        KeyHashes::derive(&self.table, key.as_ref())
    }

    /// Returns a copy of the slot at `index`, or `None` past the end.
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    /// Iterates over occupied slots in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Slot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_occupied())
            .map(|(index, slot)| (index, *slot))
    }

    /// Finds the first empty slot on the probe sequence of `hashes`.
    fn find_vacant(&self, hashes: &KeyHashes) -> Option<usize> {
        let slots: &[Slot] = &self.slots;
        let mut index = hashes.start(self.capacity);

        // Linear probing, at most one full cycle
        for _ in 0..self.capacity {
            if slots[index].is_empty() {
                return Some(index);
            }
            index = (index + 1) % self.capacity;
        }

        None
    }

    /// Records `key` in the first free slot of its probe sequence and
    /// returns that slot's index.
    ///
    /// Duplicates are not detected. Fails with [`HashIndexError::TableFull`]
    /// when the probe comes back to its starting slot; nothing is written in
    /// that case.
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K) -> Result<usize> {
        if self.is_full() {
            log::debug!("Hash index full, rejecting insert ({} slots)", self.capacity);
            return Err(HashIndexError::TableFull {
                capacity: self.capacity,
            });
        }

        let hashes = self.hashes(key);
        match self.find_vacant(&hashes) {
            Some(index) => {
                self.slots[index] = Slot::occupied_with(hashes.tag_a, hashes.tag_b);
                self.size += 1;
                Ok(index)
            }
            None => {
                log::debug!("Probe cycle exhausted, rejecting insert ({} slots)", self.capacity);
                Err(HashIndexError::TableFull {
                    capacity: self.capacity,
                })
            }
        }
    }

    /// Returns the index of the slot holding `key`'s tags, if any.
    ///
    /// The probe stops at the first empty slot, or after visiting every slot
    /// once when the table is full.
    pub fn lookup<K: AsRef<[u8]>>(&self, key: K) -> Option<usize> {
        let hashes = self.hashes(key);
        let wanted = hashes.tags();
        let slots: &[Slot] = &self.slots;
        let mut index = hashes.start(self.capacity);

        for _ in 0..self.capacity {
            match slots[index].tags() {
                None => return None,
                Some(tags) if tags == wanted => return Some(index),
                Some(_) => {}
            }
            index = (index + 1) % self.capacity;
        }

        None
    }

    /// Returns true if `key` (or a key with identical tags) was inserted
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.lookup(key).is_some()
    }
}

impl<S: ByteStore> std::fmt::Debug for HashIndex<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashIndex")
            .field("capacity", &self.capacity)
            .field("len", &self.size)
            .finish_non_exhaustive()
    }
}
