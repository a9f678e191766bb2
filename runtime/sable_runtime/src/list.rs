//! Runtime lists.
//!
//! A list is an ordered sequence of values plus an associative side table.
//! Associative assignment (`list[key] = value`) also inserts the key into
//! the sequence if it is not already present, so iteration order covers
//! every key.

use std::cell::{Ref, RefMut};

use crate::local::Local;
use crate::value::Value;

/// Backing storage of a runtime list.
#[derive(Debug, Default)]
pub struct List {
    values: Vec<Value>,
    /// Associative entries, in insertion order. Linear scan: associative
    /// lists in practice are small, and `Value` keys have no total hash.
    assoc: Vec<(Value, Value)>,
}

impl List {
    /// Create an empty list.
    pub fn new() -> Self {
        List::default()
    }

    /// Number of elements in the sequence.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append a value to the sequence.
    pub fn append(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Element at a zero-based index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The value associated with `key`, if any.
    pub fn get_assoc(&self, key: &Value) -> Option<&Value> {
        self.assoc
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Associate `value` with `key`, inserting the key into the sequence if
    /// it is not already an element.
    pub fn set_assoc(&mut self, key: Value, value: Value) {
        if !self.values.iter().any(|v| *v == key) {
            self.values.push(key.clone());
        }
        if let Some(entry) = self.assoc.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.assoc.push((key, value));
        }
    }

    /// Iterate over the sequence.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

/// Shared handle to a runtime list.
///
/// Identity-bearing: two handles are equal iff they refer to the same list
/// allocation, matching the value model's reference semantics.
#[derive(Clone, Debug)]
pub struct ListRef(Local<List>);

impl ListRef {
    /// Allocate a new empty list.
    pub fn new() -> Self {
        ListRef(Local::new(List::new()))
    }

    /// Borrow the list immutably.
    pub fn borrow(&self) -> Ref<'_, List> {
        self.0.borrow()
    }

    /// Borrow the list mutably.
    pub fn borrow_mut(&self) -> RefMut<'_, List> {
        self.0.borrow_mut()
    }

    /// True iff both handles refer to the same list.
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Default for ListRef {
    fn default() -> Self {
        ListRef::new()
    }
}

#[cfg(test)]
mod tests;
