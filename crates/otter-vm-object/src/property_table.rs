//! Ordered own-property storage
//!
//! Integer-index keys live in a `BTreeMap` so they enumerate in ascending
//! numeric order regardless of insertion order. String and symbol keys share
//! one insertion-ordered `IndexMap`; enumeration pulls strings first and
//! symbols second, each bucket keeping its own insertion order.

use crate::descriptor::Property;
use crate::property_key::PropertyKey;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::collections::BTreeMap;

/// Own properties of one object
#[derive(Clone, Debug, Default)]
pub struct PropertyTable {
    indexed: BTreeMap<u32, Property>,
    named: IndexMap<PropertyKey, Property, FxBuildHasher>,
}

impl PropertyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property
    pub fn get(&self, key: &PropertyKey) -> Option<&Property> {
        match key {
            PropertyKey::Index(i) => self.indexed.get(i),
            _ => self.named.get(key),
        }
    }

    /// Look up a property mutably
    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut Property> {
        match key {
            PropertyKey::Index(i) => self.indexed.get_mut(i),
            _ => self.named.get_mut(key),
        }
    }

    /// Check presence
    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: PropertyKey, property: Property) -> Option<Property> {
        match key {
            PropertyKey::Index(i) => self.indexed.insert(i, property),
            _ => self.named.insert(key, property),
        }
    }

    /// Remove a property, preserving the order of the rest
    pub fn remove(&mut self, key: &PropertyKey) -> Option<Property> {
        match key {
            PropertyKey::Index(i) => self.indexed.remove(i),
            _ => self.named.shift_remove(key),
        }
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.indexed.len() + self.named.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in enumeration order: indices ascending, strings, symbols.
    pub fn keys(&self) -> Vec<PropertyKey> {
        let mut keys = Vec::with_capacity(self.len());
        keys.extend(self.indexed.keys().map(|i| PropertyKey::Index(*i)));
        keys.extend(self.named.keys().filter(|k| !k.is_symbol()).cloned());
        keys.extend(self.named.keys().filter(|k| k.is_symbol()).cloned());
        keys
    }

    /// Index keys at or above `start`, highest first
    pub fn indices_from_descending(&self, start: u32) -> Vec<u32> {
        self.indexed.range(start..).rev().map(|(i, _)| *i).collect()
    }

    /// Largest index key, if any
    pub fn max_index(&self) -> Option<u32> {
        self.indexed.keys().next_back().copied()
    }

    /// Iterate over every stored property in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &Property)> {
        self.indexed
            .iter()
            .map(|(i, p)| (PropertyKey::Index(*i), p))
            .chain(
                self.named
                    .iter()
                    .filter(|(k, _)| !k.is_symbol())
                    .map(|(k, p)| (k.clone(), p)),
            )
            .chain(
                self.named
                    .iter()
                    .filter(|(k, _)| k.is_symbol())
                    .map(|(k, p)| (k.clone(), p)),
            )
    }

    /// Iterate over every property value, without ordering guarantees
    pub fn values(&self) -> impl Iterator<Item = &Property> {
        self.indexed.values().chain(self.named.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use crate::value::Value;

    #[test]
    fn test_three_bucket_order() {
        let sym = Symbol::new(None);
        let mut table = PropertyTable::new();
        table.insert(PropertyKey::string("b"), Property::data(Value::int32(1)));
        table.insert(PropertyKey::string("2"), Property::data(Value::int32(2)));
        table.insert(PropertyKey::symbol(sym.clone()), Property::data(Value::int32(3)));
        table.insert(PropertyKey::string("a"), Property::data(Value::int32(4)));
        table.insert(PropertyKey::string("1"), Property::data(Value::int32(5)));

        assert_eq!(
            table.keys(),
            vec![
                PropertyKey::Index(1),
                PropertyKey::Index(2),
                PropertyKey::string("b"),
                PropertyKey::string("a"),
                PropertyKey::symbol(sym),
            ]
        );
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut table = PropertyTable::new();
        table.insert(PropertyKey::string("x"), Property::data(Value::int32(1)));
        table.insert(PropertyKey::string("y"), Property::data(Value::int32(2)));
        table.insert(PropertyKey::string("x"), Property::data(Value::int32(3)));
        assert_eq!(
            table.keys(),
            vec![PropertyKey::string("x"), PropertyKey::string("y")]
        );
        assert_eq!(
            table.get(&PropertyKey::string("x")).and_then(|p| p.value().cloned()),
            Some(Value::int32(3))
        );
    }

    #[test]
    fn test_remove_then_reinsert_moves_to_end() {
        let mut table = PropertyTable::new();
        for name in ["a", "b", "c"] {
            table.insert(PropertyKey::string(name), Property::data(Value::undefined()));
        }
        table.remove(&PropertyKey::string("a"));
        table.insert(PropertyKey::string("a"), Property::data(Value::undefined()));
        assert_eq!(
            table.keys(),
            vec![
                PropertyKey::string("b"),
                PropertyKey::string("c"),
                PropertyKey::string("a")
            ]
        );
    }

    #[test]
    fn test_index_helpers() {
        let mut table = PropertyTable::new();
        for i in [5u32, 1, 9] {
            table.insert(PropertyKey::Index(i), Property::data(Value::undefined()));
        }
        assert_eq!(table.max_index(), Some(9));
        assert_eq!(table.indices_from_descending(2), vec![9, 5]);
        assert_eq!(table.len(), 3);
    }
}
