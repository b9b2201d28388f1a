//! Custom collection types used by the front end.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// A set that remembers insertion order and hands out stable indices.
///
/// Membership checks go through an FxHash index; entries themselves live
/// in a `Vec` so an index taken at insertion keeps naming the same entry
/// until the set is cleared.
#[derive(Debug, Clone)]
pub struct OrderedSet<K> {
    entries: Vec<K>,
    index: FxHashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> OrderedSet<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Insert `key`, returning its index and whether it was newly added.
    pub fn insert(&mut self, key: K) -> (usize, bool) {
        if let Some(&idx) = self.index.get(&key) {
            (idx, false)
        } else {
            let idx = self.entries.len();
            self.index.insert(key.clone(), idx);
            self.entries.push(key);
            (idx, true)
        }
    }

    pub fn get_index(&self, idx: usize) -> Option<&K> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl<K: Eq + Hash + Clone> Default for OrderedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
