//! Ordered collection with set semantics for equality.
//!
//! Columns and indexes keep their declaration order for DDL emission, but two
//! collections compare equal when they hold the same multiset of members.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Anything addressable by name within a table.
pub trait Named {
    fn name(&self) -> &str;
}

/// Insertion-ordered members, compared as a multiset.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct NamedSet<T> {
    items: Vec<T>,
}

impl<T> Default for NamedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Named> NamedSet<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First member with the given name. Duplicates are kept, so later ones
    /// are only reachable through iteration.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<T: Eq + Hash> NamedSet<T> {
    /// Whether an equal member exists.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    fn counts(&self) -> HashMap<&T, usize> {
        let mut counts = HashMap::with_capacity(self.items.len());
        for item in &self.items {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }
}

impl<T: Eq + Hash> PartialEq for NamedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.counts() == other.counts()
    }
}

impl<T: Eq + Hash> Eq for NamedSet<T> {}

impl<T> From<Vec<T>> for NamedSet<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for NamedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a NamedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
