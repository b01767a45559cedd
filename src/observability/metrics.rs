//! Lock metrics
//!
//! - Counters and occupancy gauges, all atomic
//! - Reset only on process start
//! - Updated by the lock from inside the guarded region, so occupancy
//!   reflects who is actually holding the data

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a [`ReaderWriterLock`](crate::rwlock::ReaderWriterLock)
///
/// Acquisition and release totals are exact. `active_*` are the number of
/// guards currently alive. `overlaps` counts every entry that observed a
/// reader and a writer inside the region at the same time; it must stay zero.
#[derive(Debug, Default)]
pub struct LockMetrics {
    read_acquisitions: AtomicU64,
    read_releases: AtomicU64,
    write_acquisitions: AtomicU64,
    write_releases: AtomicU64,
    active_readers: AtomicU64,
    active_writers: AtomicU64,
    peak_readers: AtomicU64,
    overlaps: AtomicU64,
}

impl LockMetrics {
    /// Create a registry with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter_read(&self) {
        self.read_acquisitions.fetch_add(1, Ordering::Relaxed);
        let readers = self.active_readers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_readers.fetch_max(readers, Ordering::Relaxed);
        if self.active_writers.load(Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn exit_read(&self) {
        self.active_readers.fetch_sub(1, Ordering::SeqCst);
        self.read_releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn enter_write(&self) {
        self.write_acquisitions.fetch_add(1, Ordering::Relaxed);
        let writers = self.active_writers.fetch_add(1, Ordering::SeqCst) + 1;
        if writers > 1 || self.active_readers.load(Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn exit_write(&self) {
        self.active_writers.fetch_sub(1, Ordering::SeqCst);
        self.write_releases.fetch_add(1, Ordering::Relaxed);
    }

    /// Readers currently inside the region
    pub fn active_readers(&self) -> u64 {
        self.active_readers.load(Ordering::SeqCst)
    }

    /// Writers currently inside the region (0 or 1)
    pub fn active_writers(&self) -> u64 {
        self.active_writers.load(Ordering::SeqCst)
    }

    /// Take a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> LockMetricsSnapshot {
        LockMetricsSnapshot {
            read_acquisitions: self.read_acquisitions.load(Ordering::Relaxed),
            read_releases: self.read_releases.load(Ordering::Relaxed),
            write_acquisitions: self.write_acquisitions.load(Ordering::Relaxed),
            write_releases: self.write_releases.load(Ordering::Relaxed),
            peak_readers: self.peak_readers.load(Ordering::Relaxed),
            overlaps: self.overlaps.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LockMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockMetricsSnapshot {
    pub read_acquisitions: u64,
    pub read_releases: u64,
    pub write_acquisitions: u64,
    pub write_releases: u64,
    pub peak_readers: u64,
    pub overlaps: u64,
}

impl LockMetricsSnapshot {
    /// Total acquisitions, read and write
    pub fn acquisitions(&self) -> u64 {
        self.read_acquisitions + self.write_acquisitions
    }

    /// Total releases, read and write
    pub fn releases(&self) -> u64 {
        self.read_releases + self.write_releases
    }
}
