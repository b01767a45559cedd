//! Hash-keyed record store
//!
//! Records live in an unordered singly linked list behind a
//! [`ReaderWriterLock`]. Identity is the Jenkins hash of the (truncated)
//! name: two names with the same hash are the same record, and the stored
//! name is never compared.
//!
//! INSERT, DELETE and UPDATE take the write lock; SEARCH and PRINT take the
//! read lock. Each operation holds the lock only for its own body.

mod errors;
mod hash;
mod record;

pub use errors::{StoreError, StoreResult};
pub use hash::jenkins_hash;
pub use record::{truncate_name, Record, MAX_NAME_BYTES};

use std::sync::Arc;

use crate::observability::{AuditLog, LockMetrics};
use crate::rwlock::ReaderWriterLock;
use crate::worker::WorkerId;

use record::RecordList;

/// The shared record store.
#[derive(Debug)]
pub struct RecordStore {
    records: ReaderWriterLock<RecordList>,
}

impl RecordStore {
    /// Create an empty store whose lock reports to `audit`.
    pub fn new(audit: Arc<dyn AuditLog>) -> Self {
        Self {
            records: ReaderWriterLock::new(RecordList::new(), audit),
        }
    }

    /// Insert a new record. Fails if a record with the same hash exists.
    pub fn insert(&self, who: WorkerId, name: &str, salary: u32) -> StoreResult<Record> {
        let name = truncate_name(name);
        let hash = jenkins_hash(name);

        let mut records = self.records.write(who);
        if records.find(hash).is_some() {
            return Err(StoreError::DuplicateKey { hash });
        }

        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(|_| StoreError::AllocationFailure { hash })?;
        owned.push_str(name);

        let record = Record {
            hash,
            name: owned,
            salary,
        };
        records.push_front(record.clone());
        Ok(record)
    }

    /// Remove the record with `name`'s hash and return it.
    pub fn delete(&self, who: WorkerId, name: &str) -> StoreResult<Record> {
        let hash = jenkins_hash(truncate_name(name));

        let mut records = self.records.write(who);
        records.remove(hash).ok_or(StoreError::NotFound { hash })
    }

    /// Set the salary of the record with `name`'s hash. Returns the record
    /// as it was before the update.
    pub fn update(&self, who: WorkerId, name: &str, salary: u32) -> StoreResult<Record> {
        let hash = jenkins_hash(truncate_name(name));

        let mut records = self.records.write(who);
        let record = records
            .find_mut(hash)
            .ok_or(StoreError::NotFound { hash })?;
        let previous = record.clone();
        record.salary = salary;
        Ok(previous)
    }

    /// Copy of the record with `name`'s hash, if any.
    pub fn search(&self, who: WorkerId, name: &str) -> Option<Record> {
        let hash = jenkins_hash(truncate_name(name));

        let records = self.records.read(who);
        records.find(hash).cloned()
    }

    /// Snapshot every record sorted ascending by hash and hand it to `emit`
    /// while the read lock is still held.
    pub fn print<R>(&self, who: WorkerId, emit: impl FnOnce(&[Record]) -> R) -> R {
        let records = self.records.read(who);
        let mut snapshot: Vec<Record> = records.iter().cloned().collect();
        snapshot.sort_unstable_by_key(|r| r.hash);
        emit(&snapshot)
    }

    /// Sorted copy of every record.
    pub fn snapshot(&self, who: WorkerId) -> Vec<Record> {
        self.print(who, |records| records.to_vec())
    }

    /// Number of records, read under the lock.
    pub fn len(&self, who: WorkerId) -> usize {
        self.records.read(who).len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self, who: WorkerId) -> bool {
        self.len(who) == 0
    }

    /// Counters of the store's lock.
    pub fn lock_metrics(&self) -> &LockMetrics {
        self.records.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{MemoryAuditLog, NullAuditLog};

    const W: WorkerId = WorkerId::DRIVER;

    fn store() -> RecordStore {
        RecordStore::new(Arc::new(NullAuditLog))
    }

    #[test]
    fn test_insert_distinct_names() {
        let store = store();
        let alice = store.insert(W, "Alice", 100).unwrap();
        let bob = store.insert(W, "Bob", 200).unwrap();

        assert_eq!(alice.hash, jenkins_hash("Alice"));
        assert_eq!(bob.salary, 200);
        assert_eq!(store.len(W), 2);
    }

    #[test]
    fn test_insert_duplicate_leaves_store_unchanged() {
        let store = store();
        store.insert(W, "Alice", 100).unwrap();

        let err = store.insert(W, "Alice", 999).unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey { hash: jenkins_hash("Alice") });
        assert_eq!(store.len(W), 1);
        assert_eq!(store.search(W, "Alice").unwrap().salary, 100);
    }

    #[test]
    fn test_colliding_names_share_identity() {
        let store = store();
        store.insert(W, "n41134", 1).unwrap();

        assert!(matches!(
            store.insert(W, "n45670", 2),
            Err(StoreError::DuplicateKey { .. })
        ));

        // The other name finds, updates and deletes the same record.
        let found = store.search(W, "n45670").unwrap();
        assert_eq!(found.name, "n41134");
        store.update(W, "n45670", 7).unwrap();
        assert_eq!(store.search(W, "n41134").unwrap().salary, 7);
        store.delete(W, "n45670").unwrap();
        assert!(store.is_empty(W));
    }

    #[test]
    fn test_delete_absent() {
        let store = store();
        store.insert(W, "Alice", 1).unwrap();
        assert_eq!(
            store.delete(W, "Bob"),
            Err(StoreError::NotFound { hash: jenkins_hash("Bob") })
        );
        assert_eq!(store.len(W), 1);
    }

    #[test]
    fn test_delete_returns_removed_record() {
        let store = store();
        store.insert(W, "Alice", 5).unwrap();
        let removed = store.delete(W, "Alice").unwrap();
        assert_eq!(removed.name, "Alice");
        assert_eq!(removed.salary, 5);
        assert!(store.search(W, "Alice").is_none());
    }

    #[test]
    fn test_update_returns_previous() {
        let store = store();
        store.insert(W, "Alice", 5).unwrap();
        let previous = store.update(W, "Alice", 6).unwrap();
        assert_eq!(previous.salary, 5);
        assert_eq!(store.search(W, "Alice").unwrap().salary, 6);
    }

    #[test]
    fn test_update_and_search_absent() {
        let store = store();
        assert!(matches!(
            store.update(W, "X", 500),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.search(W, "X").is_none());
        assert!(store.is_empty(W));
    }

    #[test]
    fn test_print_sorted_regardless_of_insert_order() {
        let store = store();
        for name in ["Shigeru Miyamoto", "Bob", "a", "Alice", "X"] {
            store.insert(W, name, 1).unwrap();
        }

        let snapshot = store.snapshot(W);
        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.windows(2).all(|p| p[0].hash <= p[1].hash));
    }

    #[test]
    fn test_print_runs_under_read_lock() {
        let store = store();
        store.insert(W, "Alice", 1).unwrap();
        let readers = store.print(W, |_| store.lock_metrics().active_readers());
        assert_eq!(readers, 1);
        assert_eq!(store.lock_metrics().active_readers(), 0);
    }

    #[test]
    fn test_long_names_truncated_to_same_identity() {
        let store = store();
        let base = "y".repeat(MAX_NAME_BYTES);
        let record = store.insert(W, &format!("{}tail", base), 1).unwrap();
        assert_eq!(record.name, base);
        assert!(store.search(W, &base).is_some());
    }

    #[test]
    fn test_operations_take_expected_locks() {
        let audit = Arc::new(MemoryAuditLog::new());
        let store = RecordStore::new(audit.clone());
        let who = WorkerId::new(3);

        store.insert(who, "Alice", 1).unwrap();
        store.search(who, "Alice");

        assert_eq!(
            audit.messages(),
            vec![
                "THREAD 3 WRITE LOCK ACQUIRED",
                "THREAD 3 WRITE LOCK RELEASED",
                "THREAD 3 READ LOCK ACQUIRED",
                "THREAD 3 READ LOCK RELEASED",
            ]
        );
    }
}
