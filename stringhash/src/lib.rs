pub mod byte_store;
pub mod crypt_table;
mod error;
mod fixed_buffers;
pub mod hash;
pub mod hash_index;
pub use byte_store::ByteStore;
pub use crypt_table::SubstitutionTable;
pub use error::{HashIndexError, Result};
pub use hash::{HashType, KeyHashes, hash_string};
pub use hash_index::{DEFAULT_CAPACITY, HashIndex, SLOT_SIZE, Slot, SlotState};
