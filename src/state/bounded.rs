// CLASSIFICATION: COMMUNITY
// Filename: bounded.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Fixed-capacity containers backing the state model.
//!
//! [`BoundedVec`] keeps insertion order and rejects pushes past `N`.
//! [`LogRing`] keeps the newest `N` entries and drops the oldest.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Names the collection a record lives in, for capacity errors.
pub trait Record {
    const COLLECTION: &'static str;
}

/// Insertion-ordered vector holding at most `N` records.
#[derive(Clone, PartialEq)]
pub struct BoundedVec<T, const N: usize> {
    items: Vec<T>,
}

impl<T, const N: usize> Default for BoundedVec<T, N> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for BoundedVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Record, const N: usize> BoundedVec<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= N
    }

    /// Append `item`, failing with `CapacityExceeded` when full.
    pub fn push(&mut self, item: T) -> StateResult<()> {
        if self.is_full() {
            return Err(StateError::CapacityExceeded {
                collection: T::COLLECTION,
                capacity: N,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove and return the element at `index`, keeping order.
    pub fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, f: F) {
        self.items.retain(f);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T, const N: usize> Deref for BoundedVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T, const N: usize> DerefMut for BoundedVec<T, N> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize, const N: usize> Serialize for BoundedVec<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for BoundedVec<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        if items.len() > N {
            return Err(de::Error::custom(format!(
                "{} entries exceed capacity {}",
                items.len(),
                N
            )));
        }
        Ok(Self { items })
    }
}

/// Circular buffer keeping the newest `N` entries.
#[derive(Clone, PartialEq)]
pub struct LogRing<T, const N: usize> {
    entries: VecDeque<T>,
}

impl<T, const N: usize> Default for LogRing<T, N> {
    fn default() -> Self {
        Self {
            entries: VecDeque::with_capacity(N),
        }
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for LogRing<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<T, const N: usize> LogRing<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, overwriting the oldest entry when full.
    pub fn push(&mut self, entry: T) {
        if self.entries.len() >= N {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reorder entries with a stable sort; used after bulk history seeding.
    pub fn sort_by_key<K: Ord, F: FnMut(&T) -> K>(&mut self, f: F) {
        self.entries.make_contiguous().sort_by_key(f);
    }
}

impl<T: Serialize, const N: usize> Serialize for LogRing<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for LogRing<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut ring = Self::default();
        for item in items {
            ring.push(item);
        }
        Ok(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item(u32);

    impl Record for Item {
        const COLLECTION: &'static str = "items";
    }

    #[test]
    fn rejects_past_capacity() {
        let mut v: BoundedVec<Item, 2> = BoundedVec::new();
        v.push(Item(1)).unwrap();
        v.push(Item(2)).unwrap();
        let err = v.push(Item(3)).unwrap_err();
        assert!(matches!(
            err,
            StateError::CapacityExceeded {
                collection: "items",
                capacity: 2
            }
        ));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn ring_drops_oldest() {
        let mut r: LogRing<u32, 3> = LogRing::new();
        for i in 0..5 {
            r.push(i);
        }
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn oversized_json_rejected() {
        let res: Result<BoundedVec<Item, 1>, _> = serde_json::from_str("[1,2]");
        assert!(res.is_err());
    }
}
