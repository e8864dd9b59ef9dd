//! Fixed-capacity recency cache with least-recently-used eviction.
//!
//! Entries live in an arena (`Vec` of slots) and are chained into a doubly
//! linked recency order through `older`/`newer` slot indices, so `get`,
//! `put` and promotion are all O(1) without any raw pointer bookkeeping.
//!
//! The cache is not internally synchronized: `get` mutates the recency
//! links, so concurrent callers must serialize access (the pipeline wraps
//! it in a `tokio::sync::Mutex`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::Error;

/// One arena slot: a cached page body plus its recency links.
#[derive(Debug)]
struct Slot {
    key: String,
    content: String,
    created_at: DateTime<Utc>,
    /// Next slot towards `oldest`, `None` when this slot is the oldest.
    older: Option<usize>,
    /// Next slot towards `newest`, `None` when this slot is the newest.
    newer: Option<usize>,
}

/// Fixed-capacity key -> content store with LRU eviction.
///
/// `put` is first-write-wins: putting an existing key keeps the stored
/// content and only refreshes its recency, matching the cache-aside usage
/// where a key is only put after a genuine miss.
#[derive(Debug)]
pub struct RecencyCache {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    newest: Option<usize>,
    oldest: Option<usize>,
    capacity: usize,
}

impl RecencyCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }

        Ok(Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            newest: None,
            oldest: None,
            capacity,
        })
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert `content` under `key`, evicting the least recently used
    /// entry when the cache is full.
    ///
    /// A repeated `put` of an existing key does not overwrite the stored
    /// content; it only promotes the entry to newest.
    pub fn put(&mut self, key: &str, content: &str) {
        if let Some(&idx) = self.index.get(key) {
            self.promote(idx);
            return;
        }

        let idx = if self.index.len() == self.capacity {
            let evicted = self.evict_oldest();
            let slot = &mut self.slots[evicted];
            slot.key = key.to_owned();
            slot.content = content.to_owned();
            slot.created_at = Utc::now();
            evicted
        } else {
            self.slots.push(Slot {
                key: key.to_owned(),
                content: content.to_owned(),
                created_at: Utc::now(),
                older: None,
                newer: None,
            });
            self.slots.len() - 1
        };

        self.index.insert(key.to_owned(), idx);
        self.link_newest(idx);
    }

    /// Look up `key`, promoting the entry to newest on a hit.
    ///
    /// A miss performs no mutation at all.
    pub fn get(&mut self, key: &str) -> Option<&str> {
        let idx = *self.index.get(key)?;
        self.promote(idx);
        Some(&self.slots[idx].content)
    }

    /// Timestamp recorded when the entry under `key` was first inserted.
    /// Does not touch recency.
    pub fn created_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.index.get(key).map(|&idx| self.slots[idx].created_at)
    }

    /// Splice the slot out of its current position and relink it as newest.
    /// No-op when the slot already is the newest entry.
    fn promote(&mut self, idx: usize) {
        if self.newest == Some(idx) {
            return;
        }

        let older = self.slots[idx].older;
        // Not the newest, so a newer neighbor must exist.
        let newer = self.slots[idx].newer.expect("non-newest slot has a newer link");

        self.slots[newer].older = older;
        match older {
            Some(older) => self.slots[older].newer = Some(newer),
            None => self.oldest = Some(newer),
        }

        self.slots[idx].older = None;
        self.slots[idx].newer = None;
        self.link_newest(idx);
    }

    /// Attach an unlinked slot at the newest end of the chain.
    fn link_newest(&mut self, idx: usize) {
        self.slots[idx].older = self.newest;
        self.slots[idx].newer = None;

        if let Some(prev_newest) = self.newest {
            self.slots[prev_newest].newer = Some(idx);
        } else {
            self.oldest = Some(idx);
        }
        self.newest = Some(idx);
    }

    /// Unlink the oldest slot, drop its key from the index, and return the
    /// freed slot for reuse.
    fn evict_oldest(&mut self) -> usize {
        let idx = self.oldest.expect("eviction requires a non-empty cache");

        let newer = self.slots[idx].newer;
        self.oldest = newer;
        match newer {
            Some(newer) => self.slots[newer].older = None,
            None => self.newest = None,
        }
        self.slots[idx].older = None;
        self.slots[idx].newer = None;

        let key = std::mem::take(&mut self.slots[idx].key);
        tracing::debug!(evicted_key = %key, "cache full, evicting oldest entry");
        self.index.remove(&key);
        idx
    }

    /// Keys ordered newest to oldest. Used to verify the recency chain.
    #[cfg(test)]
    fn keys_newest_first(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.newest;
        while let Some(idx) = cursor {
            keys.push(self.slots[idx].key.as_str());
            cursor = self.slots[idx].older;
        }
        keys
    }
}
