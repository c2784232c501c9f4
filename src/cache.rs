//! Identity-keyed memoization for derived render data
//!
//! Entries are keyed by a source object's `(id, generation)` pair and hold
//! only data derived from it, never the source itself. The cache may be
//! empty at any time; callers recompute on a miss.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity for meshes and bitmaps
pub fn next_object_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

struct Entry<V> {
    id: u64,
    generation: u64,
    last_used: u64,
    value: V,
}

/// Small least-recently-used cache keyed by object identity
pub struct IdentityCache<V> {
    entries: Vec<Entry<V>>,
    capacity: usize,
    clock: u64,
}

impl<V> IdentityCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity, evicting the oldest entries if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    /// Return the cached value for `(id, generation)`, building it with
    /// `make` on a miss. An entry for the same id with a stale generation
    /// is handed to `make` for reuse.
    pub fn get_or_insert_with<F>(&mut self, id: u64, generation: u64, make: F) -> Option<&mut V>
    where
        F: FnOnce(Option<V>) -> V,
    {
        if self.capacity == 0 {
            return None;
        }
        self.clock += 1;
        let clock = self.clock;

        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            if self.entries[pos].generation != generation {
                let stale = self.entries.swap_remove(pos);
                log::trace!("cache: rebuilding id {} ({} -> {})", id, stale.generation, generation);
                self.insert(id, generation, clock, make(Some(stale.value)));
            } else {
                self.entries[pos].last_used = clock;
            }
        } else {
            while self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
            self.insert(id, generation, clock, make(None));
        }

        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.value)
    }

    fn insert(&mut self, id: u64, generation: u64, clock: u64, value: V) {
        self.entries.push(Entry {
            id,
            generation,
            last_used: clock,
            value,
        });
    }

    fn evict_oldest(&mut self) {
        if let Some(pos) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(i, _)| i)
        {
            let e = self.entries.swap_remove(pos);
            log::debug!("cache: evicted id {}", e.id);
        }
    }
}
