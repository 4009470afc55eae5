//! Allocation accounting for tests.
//!
//! [`TrackingAllocator`] wraps another allocator and counts the allocations
//! made on the current thread inside a [`TrackingAllocator::measure`] scope.
//! Install it with `#[global_allocator]` in a test binary:
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOC: alloc_tracker::TrackingAllocator = alloc_tracker::TrackingAllocator::system();
//!
//! let (value, stats) = ALLOC.measure(|| vec![1u8; 64]);
//! assert_eq!(stats.allocations, 1);
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

std::thread_local! {
    // const-initialized and drop-free, so reading it never allocates
    static TRACKING: Cell<bool> = const { Cell::new(false) };
}

fn is_tracking() -> bool {
    TRACKING.try_with(Cell::get).unwrap_or(false)
}

/// Counts gathered over one measured scope.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocStats {
    pub allocations: usize,
    pub deallocations: usize,
    pub reallocations: usize,
    pub bytes_allocated: usize,
    pub bytes_deallocated: usize,
}

impl AllocStats {
    /// Allocations made in the scope and not freed in it
    pub fn outstanding_allocations(&self) -> usize {
        self.allocations.saturating_sub(self.deallocations)
    }

    /// Bytes allocated in the scope and not freed in it
    pub fn outstanding_bytes(&self) -> usize {
        self.bytes_allocated.saturating_sub(self.bytes_deallocated)
    }

    /// True when everything allocated in the scope was also freed in it
    pub fn is_balanced(&self) -> bool {
        self.allocations == self.deallocations && self.bytes_allocated == self.bytes_deallocated
    }

    fn since(&self, earlier: &AllocStats) -> AllocStats {
        AllocStats {
            allocations: self.allocations - earlier.allocations,
            deallocations: self.deallocations - earlier.deallocations,
            reallocations: self.reallocations - earlier.reallocations,
            bytes_allocated: self.bytes_allocated - earlier.bytes_allocated,
            bytes_deallocated: self.bytes_deallocated - earlier.bytes_deallocated,
        }
    }
}

/// Logs the outcome of a measured scope: a warning listing what is still
/// allocated, or a short note that everything was released.
pub fn report(stats: &AllocStats) {
    if stats.is_balanced() {
        log::info!(
            "No leaks: {} allocation(s), {} bytes, all released",
            stats.allocations,
            stats.bytes_allocated
        );
    } else {
        log::warn!(
            "{} allocation(s) not released, {} bytes outstanding ({} allocated, {} freed)",
            stats.outstanding_allocations(),
            stats.outstanding_bytes(),
            stats.allocations,
            stats.deallocations
        );
    }
}

/// A `GlobalAlloc` wrapper that counts what passes through it.
///
/// Only calls made on a thread that is inside [`measure`](Self::measure) are
/// counted, so the test harness and other threads do not show up. Measured
/// scopes are serialized across threads; a nested scope on the same thread
/// joins the outer one.
pub struct TrackingAllocator<A = System> {
    inner: A,
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    reallocations: AtomicUsize,
    bytes_allocated: AtomicUsize,
    bytes_deallocated: AtomicUsize,
    scope: Mutex<()>,
}

impl TrackingAllocator<System> {
    pub const fn system() -> Self {
        Self::new(System)
    }
}

impl Default for TrackingAllocator<System> {
    fn default() -> Self {
        Self::system()
    }
}

struct ScopeGuard<'a> {
    was_tracking: bool,
    _lock: Option<MutexGuard<'a, ()>>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let was_tracking = self.was_tracking;
        let _ = TRACKING.try_with(|t| t.set(was_tracking));
    }
}

impl<A> TrackingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            reallocations: AtomicUsize::new(0),
            bytes_allocated: AtomicUsize::new(0),
            bytes_deallocated: AtomicUsize::new(0),
            scope: Mutex::new(()),
        }
    }

    /// Running totals since the allocator was created.
    pub fn snapshot(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
            reallocations: self.reallocations.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            bytes_deallocated: self.bytes_deallocated.load(Ordering::Relaxed),
        }
    }

    /// Runs `f` with counting enabled on this thread and returns its result
    /// together with what it allocated and freed.
    pub fn measure<R>(&self, f: impl FnOnce() -> R) -> (R, AllocStats) {
        let was_tracking = is_tracking();
        let lock = if was_tracking {
            None
        } else {
            Some(self.scope.lock().unwrap_or_else(PoisonError::into_inner))
        };

        let before = self.snapshot();
        let guard = ScopeGuard {
            was_tracking,
            _lock: lock,
        };
        let _ = TRACKING.try_with(|t| t.set(true));

        let result = f();

        let after = self.snapshot();
        drop(guard);
        (result, after.since(&before))
    }

    fn record_alloc(&self, size: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated.fetch_add(size, Ordering::Relaxed);
    }

    fn record_dealloc(&self, size: usize) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_deallocated.fetch_add(size, Ordering::Relaxed);
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() && is_tracking() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if !ptr.is_null() && is_tracking() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        if is_tracking() {
            self.record_dealloc(layout.size());
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && is_tracking() {
            // counted as a move of the bytes, not as a fresh allocation
            self.reallocations.fetch_add(1, Ordering::Relaxed);
            self.bytes_allocated.fetch_add(new_size, Ordering::Relaxed);
            self.bytes_deallocated
                .fetch_add(layout.size(), Ordering::Relaxed);
        }
        new_ptr
    }
}
