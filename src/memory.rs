//! Allocator configuration and allocation statistics
//!
//! With `memory_tracking` enabled every allocation is counted so the host
//! can observe how much native memory parsed documents hold. Without it
//! the statistics read as zero.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Live-byte counter with a resettable high-water mark
pub struct AllocationStats {
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl AllocationStats {
    pub const fn new() -> Self {
        AllocationStats {
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn record_alloc(&self, size: usize) {
        let live = self.live.fetch_add(size, Ordering::Relaxed) + size;
        self.peak.fetch_max(live, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dealloc(&self, size: usize) {
        self.live.fetch_sub(size, Ordering::Relaxed);
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Lower the peak to the live level, returning `(live, previous_peak)`
    pub fn reset_peak(&self) -> (usize, usize) {
        let live = self.live();
        (live, self.peak.swap(live, Ordering::SeqCst))
    }
}

impl Default for AllocationStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};

    use super::AllocationStats;

    pub static STATS: AllocationStats = AllocationStats::new();

    /// Wraps an allocator and reports every size change to `STATS`
    pub struct TrackingAllocator<A> {
        inner: A,
    }

    impl<A> TrackingAllocator<A> {
        pub const fn new(inner: A) -> Self {
            TrackingAllocator { inner }
        }
    }

    unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = self.inner.alloc(layout);
            if !ptr.is_null() {
                STATS.record_alloc(layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            STATS.record_dealloc(layout.size());
            self.inner.dealloc(ptr, layout)
        }
    }
}

#[cfg(all(feature = "memory_tracking", feature = "mimalloc"))]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator<mimalloc::MiMalloc> =
    tracking::TrackingAllocator::new(mimalloc::MiMalloc);

#[cfg(all(feature = "memory_tracking", not(feature = "mimalloc")))]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator<std::alloc::System> =
    tracking::TrackingAllocator::new(std::alloc::System);

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated
pub fn current() -> usize {
    #[cfg(feature = "memory_tracking")]
    return tracking::STATS.live();
    #[cfg(not(feature = "memory_tracking"))]
    return 0;
}

/// Highest allocation level since the last reset
pub fn peak() -> usize {
    #[cfg(feature = "memory_tracking")]
    return tracking::STATS.peak();
    #[cfg(not(feature = "memory_tracking"))]
    return 0;
}

/// Reset the peak to the current level, returning `(current, previous_peak)`
pub fn reset() -> (usize, usize) {
    #[cfg(feature = "memory_tracking")]
    return tracking::STATS.reset_peak();
    #[cfg(not(feature = "memory_tracking"))]
    return (0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_peak_and_reset() {
        let stats = AllocationStats::new();
        stats.record_alloc(100);
        stats.record_alloc(50);
        stats.record_dealloc(120);
        assert_eq!(stats.live(), 30);
        assert_eq!(stats.peak(), 150);

        assert_eq!(stats.reset_peak(), (30, 150));
        assert_eq!(stats.peak(), 30);
        stats.record_alloc(10);
        assert_eq!(stats.peak(), 40);
    }

    #[cfg(feature = "memory_tracking")]
    #[test]
    fn test_global_peak_tracks_allocations() {
        let buf: Vec<u8> = Vec::with_capacity(1 << 20);
        assert!(peak() >= buf.capacity());
        drop(buf);
        let (_, previous_peak) = reset();
        assert!(previous_peak >= 1 << 20);
    }
}
