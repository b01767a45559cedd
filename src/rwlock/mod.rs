//! First-readers-writers lock built from two semaphores
//!
//! - `counter` is a binary semaphore protecting the reader count
//! - `writelock` is a binary semaphore held by one writer, or by the
//!   readers as a group
//!
//! Only the 0 -> 1 and 1 -> 0 reader transitions touch `writelock`. Nothing
//! stops a steady stream of readers from keeping a writer out forever; that
//! is the accepted behavior of this variant. The lock is not re-entrant: a
//! thread that already holds it and asks again deadlocks.
//!
//! Every transition writes `THREAD <n> {READ|WRITE} LOCK {ACQUIRED|RELEASED}`
//! to the audit log, after the permit has actually changed hands.

mod semaphore;

pub use semaphore::Semaphore;

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::observability::{self, AuditLog, LockMetrics};
use crate::worker::WorkerId;

/// Reader-writer lock owning a `T`.
///
/// Access goes through [`read`](Self::read) and [`write`](Self::write), which
/// return guards. Dropping a guard releases the lock.
pub struct ReaderWriterLock<T> {
    counter: Semaphore,
    writelock: Semaphore,
    /// Only touched while `counter` is held.
    readers: AtomicUsize,
    metrics: LockMetrics,
    audit: Arc<dyn AuditLog>,
    data: UnsafeCell<T>,
}

// SAFETY: the semaphore protocol hands out either one `&mut T` (write guard)
// or any number of `&T` (read guards), never both at once. Moving the lock
// across threads moves the `T`, hence `T: Send`; sharing it hands `&T` to
// several threads, hence `T: Sync` as well.
unsafe impl<T: Send> Send for ReaderWriterLock<T> {}
unsafe impl<T: Send + Sync> Sync for ReaderWriterLock<T> {}

impl<T> ReaderWriterLock<T> {
    /// Wrap `data`, reporting transitions to `audit`.
    pub fn new(data: T, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            counter: Semaphore::new(1),
            writelock: Semaphore::new(1),
            readers: AtomicUsize::new(0),
            metrics: LockMetrics::new(),
            audit,
            data: UnsafeCell::new(data),
        }
    }

    /// Take shared access for `who`.
    pub fn read(&self, who: WorkerId) -> ReadGuard<'_, T> {
        self.acquire_read(who);
        ReadGuard { lock: self, who }
    }

    /// Take exclusive access for `who`.
    pub fn write(&self, who: WorkerId) -> WriteGuard<'_, T> {
        self.acquire_write(who);
        WriteGuard { lock: self, who }
    }

    fn acquire_read(&self, who: WorkerId) {
        self.counter.wait();
        let readers = self.readers.load(Ordering::Relaxed) + 1;
        self.readers.store(readers, Ordering::Relaxed);
        if readers == 1 {
            self.writelock.wait();
        }
        self.counter.post();

        self.metrics.enter_read();
        observability::audit(&*self.audit, &format!("{} READ LOCK ACQUIRED", who));
    }

    fn release_read(&self, who: WorkerId) {
        self.metrics.exit_read();

        self.counter.wait();
        let readers = self.readers.load(Ordering::Relaxed) - 1;
        self.readers.store(readers, Ordering::Relaxed);
        if readers == 0 {
            self.writelock.post();
        }
        self.counter.post();

        observability::audit(&*self.audit, &format!("{} READ LOCK RELEASED", who));
    }

    fn acquire_write(&self, who: WorkerId) {
        self.writelock.wait();

        self.metrics.enter_write();
        observability::audit(&*self.audit, &format!("{} WRITE LOCK ACQUIRED", who));
    }

    fn release_write(&self, who: WorkerId) {
        self.metrics.exit_write();
        self.writelock.post();

        observability::audit(&*self.audit, &format!("{} WRITE LOCK RELEASED", who));
    }

    /// Occupancy and transition counters for this lock.
    pub fn metrics(&self) -> &LockMetrics {
        &self.metrics
    }

    /// Readers currently holding the lock.
    pub fn reader_count(&self) -> usize {
        self.counter.wait();
        let readers = self.readers.load(Ordering::Relaxed);
        self.counter.post();
        readers
    }

    /// Mutable access without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the lock and return the data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T> fmt::Debug for ReaderWriterLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderWriterLock")
            .field("readers", &self.readers.load(Ordering::Relaxed))
            .field("writer_permit_free", &(self.writelock.available() == 1))
            .finish_non_exhaustive()
    }
}

/// Shared access to the data of a [`ReaderWriterLock`].
pub struct ReadGuard<'a, T> {
    lock: &'a ReaderWriterLock<T>,
    who: WorkerId,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: a live read guard means `writelock` is held by the reader
        // group, so no write guard exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read(self.who);
    }
}

/// Exclusive access to the data of a [`ReaderWriterLock`].
pub struct WriteGuard<'a, T> {
    lock: &'a ReaderWriterLock<T>,
    who: WorkerId,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard holds `writelock`; no other guard exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this guard holds `writelock`; no other guard exists.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write(self.who);
    }
}
