//! Ordered set of unique values with stable, insertion-assigned positions.
//!
//! An [`Indexer`] hands out a position number for each distinct value the first time it is
//! seen. That number never changes, so it can address a row or column of a matrix.
//! Presentation order is separate: [`Indexer::list`] returns the values sorted ascending,
//! sorting lazily and only when an out-of-order value was ever appended.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::OnceLock;

/// Holds a unique set of values and records the order in which they were added.
///
/// Works for any totally ordered, hashable key. The dataset uses it for timestamps
/// (rows) and column names (columns).
#[derive(Debug)]
pub struct Indexer<T> {
    /// Presentation sequence. Append-only, except that `list` may sort it in place.
    values: Vec<T>,
    /// value -> position assigned at insertion time.
    indices: HashMap<T, usize>,
    /// True iff `values` is currently sorted ascending.
    in_order: bool,
    /// Sorted snapshot for shared-reference reads while `values` is out of order.
    /// Cleared by every insert.
    sorted_view: OnceLock<Vec<T>>,
}

impl<T> Default for Indexer<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            indices: HashMap::new(),
            in_order: true,
            sorted_view: OnceLock::new(),
        }
    }
}

impl<T: Ord + Hash + Clone> Indexer<T> {
    /// Creates an empty indexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value. Returns the value's position and whether it was newly added.
    ///
    /// A value that is already registered keeps its original position and the indexer
    /// is left untouched.
    pub fn add(&mut self, value: T) -> (usize, bool) {
        if let Some(&index) = self.indices.get(&value) {
            return (index, false);
        }

        let index = self.values.len();
        // Only the tail needs checking: everything before it is either sorted already or
        // the flag is down anyway.
        if self.in_order {
            if let Some(last) = self.values.last() {
                self.in_order = value >= *last;
            }
        }
        self.indices.insert(value.clone(), index);
        self.values.push(value);
        self.sorted_view.take();
        (index, true)
    }

    /// Returns the position assigned to `value` when it was added. Never sorts.
    #[inline]
    pub fn get_index<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.indices.get(value).copied()
    }

    /// Number of distinct values ever added.
    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the values sorted ascending.
    ///
    /// Sorting happens at most once per run of out-of-order inserts; the result is cached
    /// until the next out-of-order [`Indexer::add`]. Positions returned by
    /// [`Indexer::get_index`] are unaffected.
    pub fn list(&mut self) -> &[T] {
        if !self.in_order {
            self.values.sort_unstable();
            self.in_order = true;
            self.sorted_view.take();
        }
        &self.values
    }

    /// Like [`Indexer::list`], but usable through a shared reference.
    ///
    /// When out of order, the first call sorts a snapshot and later calls reuse it until
    /// the next [`Indexer::add`] of a new value.
    pub fn sorted(&self) -> &[T] {
        if self.in_order {
            return &self.values;
        }
        self.sorted_view.get_or_init(|| {
            let mut values = self.values.clone();
            values.sort_unstable();
            values
        })
    }

    #[cfg(test)]
    pub(crate) fn has_sorted_view(&self) -> bool {
        self.in_order || self.sorted_view.get().is_some()
    }

    /// Returns an independent copy.
    ///
    /// The copy does not trust the source's cached order and re-sorts on its first
    /// `list`; the sorted output is the same either way.
    pub fn copy(&self) -> Self {
        Self {
            values: self.values.clone(),
            indices: self.indices.clone(),
            in_order: self.values.len() < 2,
            sorted_view: OnceLock::new(),
        }
    }
}

impl<T: Ord + Hash + Clone> Clone for Indexer<T> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<T: Ord + Hash + Clone> FromIterator<T> for Indexer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut indexer = Indexer::new();
        for value in iter {
            indexer.add(value);
        }
        indexer
    }
}
