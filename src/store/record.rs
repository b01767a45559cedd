//! Records and the unordered list that holds them

use std::fmt;

/// Longest name a record keeps, in bytes.
pub const MAX_NAME_BYTES: usize = 49;

/// Cut `name` to at most [`MAX_NAME_BYTES`] bytes without splitting a
/// character.
pub fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_NAME_BYTES {
        return name;
    }
    let mut end = MAX_NAME_BYTES;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// A stored record. Callers only ever see copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub hash: u32,
    pub name: String,
    pub salary: u32,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.hash, self.name, self.salary)
    }
}

struct Node {
    record: Record,
    next: Option<Box<Node>>,
}

/// Singly linked, most-recent-first, one record per hash.
///
/// Lookups are linear scans comparing hashes only.
#[derive(Default)]
pub(crate) struct RecordList {
    head: Option<Box<Node>>,
    len: usize,
}

impl RecordList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn find(&self, hash: u32) -> Option<&Record> {
        self.iter().find(|r| r.hash == hash)
    }

    pub(crate) fn find_mut(&mut self, hash: u32) -> Option<&mut Record> {
        let mut cursor = self.head.as_deref_mut();
        while let Some(node) = cursor {
            if node.record.hash == hash {
                return Some(&mut node.record);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    /// Caller guarantees `record.hash` is not already present.
    pub(crate) fn push_front(&mut self, record: Record) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { record, next }));
        self.len += 1;
    }

    pub(crate) fn remove(&mut self, hash: u32) -> Option<Record> {
        let mut cursor = &mut self.head;
        while cursor.as_ref().is_some_and(|node| node.record.hash != hash) {
            cursor = &mut cursor.as_mut()?.next;
        }
        let node = *cursor.take()?;
        *cursor = node.next;
        self.len -= 1;
        Some(node.record)
    }

    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl Drop for RecordList {
    fn drop(&mut self) {
        // Unlink iteratively; the default drop recurses once per node.
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

pub(crate) struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(&node.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: u32, salary: u32) -> Record {
        Record {
            hash,
            name: format!("r{}", hash),
            salary,
        }
    }

    #[test]
    fn test_truncate_name() {
        let long = "x".repeat(80);
        assert_eq!(truncate_name(&long).len(), MAX_NAME_BYTES);
        assert_eq!(truncate_name("short"), "short");

        // 24 two-byte characters plus one more would straddle byte 49.
        let wide = "é".repeat(30);
        let cut = truncate_name(&wide);
        assert_eq!(cut.len(), 48);
        assert_eq!(cut.chars().count(), 24);
    }

    #[test]
    fn test_push_front_is_most_recent_first() {
        let mut list = RecordList::new();
        list.push_front(record(1, 10));
        list.push_front(record(2, 20));
        list.push_front(record(3, 30));

        let hashes: Vec<_> = list.iter().map(|r| r.hash).collect();
        assert_eq!(hashes, vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut list = RecordList::new();
        for h in 1..=4 {
            list.push_front(record(h, h * 10));
        }

        assert_eq!(list.remove(4).map(|r| r.salary), Some(40));
        assert_eq!(list.remove(2).map(|r| r.salary), Some(20));
        assert_eq!(list.remove(1).map(|r| r.salary), Some(10));
        assert!(list.remove(9).is_none());

        let hashes: Vec<_> = list.iter().map(|r| r.hash).collect();
        assert_eq!(hashes, vec![3]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_find_mut_updates_in_place() {
        let mut list = RecordList::new();
        list.push_front(record(5, 1));
        list.find_mut(5).unwrap().salary = 99;
        assert_eq!(list.find(5).unwrap().salary, 99);
        assert!(list.find_mut(6).is_none());
    }

    #[test]
    fn test_long_list_drops_without_overflow() {
        let mut list = RecordList::new();
        for h in 0..200_000 {
            list.push_front(record(h, 0));
        }
        drop(list);
    }
}
