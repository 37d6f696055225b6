//! In-memory record of articles that have already been posted.
//!
//! The store lives only as long as the process. By default it grows without
//! bound; a capacity turns it into a FIFO that forgets the oldest entries.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

/// Identity of an article for dedup purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    title: String,
    url: String,
}

impl Fingerprint {
    #[must_use]
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            url: url.trim().to_string(),
        }
    }
}

/// Set of fingerprints that have been published.
#[derive(Debug, Default)]
pub struct DedupStore {
    seen: HashSet<Fingerprint>,
    order: VecDeque<Fingerprint>,
    capacity: Option<usize>,
}

impl DedupStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that keeps at most `capacity` fingerprints.
    ///
    /// Storage grows with use; nothing is reserved up front.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Build from an optional capacity (`None` = unbounded).
    #[must_use]
    pub fn from_capacity(capacity: Option<usize>) -> Self {
        capacity.map_or_else(Self::new, Self::with_capacity)
    }

    #[must_use]
    pub fn is_new(&self, fingerprint: &Fingerprint) -> bool {
        !self.seen.contains(fingerprint)
    }

    /// Mark a fingerprint as published. Recording twice is a no-op.
    pub fn record(&mut self, fingerprint: Fingerprint) {
        if self.seen.contains(&fingerprint) {
            return;
        }
        if let Some(capacity) = self.capacity {
            while self.order.len() >= capacity {
                if let Some(evicted) = self.order.pop_front() {
                    debug!(title = %evicted.title, url = %evicted.url, "Evicting oldest fingerprint");
                    self.seen.remove(&evicted);
                }
            }
            self.order.push_back(fingerprint.clone());
        }
        self.seen.insert(fingerprint);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_then_reject() {
        let mut store = DedupStore::new();
        let fp = Fingerprint::new("Title", "https://example.com/a");

        assert!(store.is_new(&fp));
        store.record(fp.clone());
        assert!(!store.is_new(&fp));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fingerprint_uses_title_and_url() {
        let mut store = DedupStore::new();
        store.record(Fingerprint::new("Title", "https://example.com/a"));

        // Same title, different URL is a different article.
        assert!(store.is_new(&Fingerprint::new("Title", "https://example.com/b")));
        // Surrounding whitespace does not create a new identity.
        assert!(!store.is_new(&Fingerprint::new(" Title ", "https://example.com/a\n")));
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut store = DedupStore::with_capacity(2);
        let fp = Fingerprint::new("A", "u1");
        store.record(fp.clone());
        store.record(fp.clone());
        store.record(Fingerprint::new("B", "u2"));

        // The duplicate must not have taken a slot.
        assert!(!store.is_new(&fp));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut store = DedupStore::from_capacity(None);
        for i in 0..1000 {
            store.record(Fingerprint::new(&format!("t{i}"), &format!("u{i}")));
        }
        assert_eq!(store.len(), 1000);
        assert_eq!(store.capacity(), None);
        assert!(!store.is_new(&Fingerprint::new("t0", "u0")));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = DedupStore::from_capacity(Some(2));
        store.record(Fingerprint::new("A", "u1"));
        store.record(Fingerprint::new("B", "u2"));
        store.record(Fingerprint::new("C", "u3"));

        assert_eq!(store.len(), 2);
        assert!(store.is_new(&Fingerprint::new("A", "u1")));
        assert!(!store.is_new(&Fingerprint::new("B", "u2")));
        assert!(!store.is_new(&Fingerprint::new("C", "u3")));
    }

    #[test]
    fn test_huge_capacity_reserves_nothing() {
        let mut store = DedupStore::from_capacity(Some(usize::MAX / 4));
        assert_eq!(store.capacity(), Some(usize::MAX / 4));
        assert!(store.seen.capacity() < 16);
        assert!(store.order.capacity() < 16);

        store.record(Fingerprint::new("A", "u1"));
        assert_eq!(store.len(), 1);
        assert!(store.order.capacity() < 1024);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut store = DedupStore::with_capacity(0);
        assert_eq!(store.capacity(), Some(1));
        store.record(Fingerprint::new("A", "u1"));
        store.record(Fingerprint::new("B", "u2"));
        assert_eq!(store.len(), 1);
        assert!(!store.is_new(&Fingerprint::new("B", "u2")));
    }
}
