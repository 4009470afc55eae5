use alloc_tracker::{TrackingAllocator, report};
use stringhash::{DEFAULT_CAPACITY, HashIndex, SLOT_SIZE, crypt_table::TABLE_LEN};

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator::system();

const TABLE_BYTES: usize = TABLE_LEN * std::mem::size_of::<u32>();

#[test]
fn construction_allocates_slots_and_table_once() {
    let (index, stats) = ALLOC.measure(|| HashIndex::new(256).unwrap());

    assert_eq!(stats.allocations, 2);
    assert_eq!(stats.reallocations, 0);
    assert_eq!(stats.deallocations, 0);
    assert_eq!(stats.bytes_allocated, 256 * SLOT_SIZE + TABLE_BYTES);

    let ((), stats) = ALLOC.measure(|| drop(index));
    assert_eq!(stats.deallocations, 2);
    assert_eq!(stats.bytes_deallocated, 256 * SLOT_SIZE + TABLE_BYTES);
}

#[test]
fn default_index_allocates_twice() {
    let ((), stats) = ALLOC.measure(|| {
        let index = HashIndex::default();
        assert_eq!(index.capacity(), DEFAULT_CAPACITY);
    });

    assert_eq!(stats.allocations, 2);
    assert!(stats.is_balanced());
    report(&stats);
}

#[test]
fn insert_and_lookup_do_not_allocate() {
    let mut index = HashIndex::new(64).unwrap();
    let keys: Vec<String> = (0..65).map(|i| format!("units\\unit{i}.mdx")).collect();

    let ((), stats) = ALLOC.measure(|| {
        for key in &keys[..64] {
            index.insert(key).unwrap();
        }
        // full table: the absent key walks the whole probe cycle
        assert!(index.insert(&keys[64]).is_err());
        for key in &keys {
            index.lookup(key);
        }
    });

    assert_eq!(stats, alloc_tracker::AllocStats::default());
}

#[test]
fn caller_store_only_allocates_table() {
    let (index, stats) = ALLOC.measure(|| HashIndex::with_store([0u8; SLOT_SIZE * 16]).unwrap());

    assert_eq!(stats.allocations, 1);
    assert_eq!(stats.bytes_allocated, TABLE_BYTES);
    assert_eq!(index.capacity(), 16);
}

#[test]
fn rejected_capacity_allocates_nothing() {
    let (result, stats) = ALLOC.measure(|| HashIndex::new(0));

    assert!(result.is_err());
    assert_eq!(stats.allocations, 0);
}
