//! Associative-data adapter for serializers without open-ended map support.
//!
//! The structured codecs serialize fixed-shape records and ordered sequences.
//! Associative sections of the save model (quest flags, settings, named
//! counters) are therefore flattened into an explicit `(key, value)` record
//! sequence before serialization and folded back into a map after
//! deserialization. Synchronization between the two representations is always
//! explicit; the codec layer never touches it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One serializer-compatible entry of an associative section.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub key: String,
    pub value: T,
}

/// Flatten a mapping into a record sequence.
///
/// Every entry appears exactly once with its current value. No ordering
/// guarantee is made (or needed) for correctness.
pub fn to_records<T: Clone>(map: &HashMap<String, T>) -> Vec<Record<T>> {
    map.iter()
        .map(|(key, value)| Record { key: key.clone(), value: value.clone() })
        .collect()
}

/// Fold a record sequence back into a mapping.
///
/// Records with an empty key are skipped (not an error). Duplicate keys
/// resolve last-write-wins.
pub fn from_records<T: Clone>(records: &[Record<T>]) -> HashMap<String, T> {
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        if record.key.is_empty() {
            continue;
        }
        map.insert(record.key.clone(), record.value.clone());
    }
    map
}

/// An associative section: a live map view plus its on-disk record sequence.
///
/// Only `items` is serialized. The live map is rebuilt explicitly with
/// [`RecordMap::sync_from_records`] after deserialization, and `items` is
/// refreshed with [`RecordMap::sync_to_records`] before serialization.
/// Forgetting the former leaves the map appearing empty despite populated
/// records, so the persistence manager drives both steps for every section.
// The explicit bound keeps the derive from demanding `T: Default` for the
// skipped map field; value types like tagged extension values implement no
// Default.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(bound(serialize = "T: serde::Serialize", deserialize = "T: serde::de::DeserializeOwned"))]
pub struct RecordMap<T> {
    items: Vec<Record<T>>,

    #[serde(skip)]
    map: HashMap<String, T>,
}

impl<T> Default for RecordMap<T> {
    fn default() -> Self {
        Self { items: Vec::new(), map: HashMap::new() }
    }
}

// Equality is defined on the live mapping; the record sequence is a
// serialization artifact with no guaranteed order.
impl<T: PartialEq> PartialEq for RecordMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Clone> RecordMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.map.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        self.map.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.map.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.map.iter()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.items.clear();
    }

    /// The current on-disk representation. Stale until
    /// [`RecordMap::sync_to_records`] runs.
    pub fn records(&self) -> &[Record<T>] {
        &self.items
    }

    /// Refresh the record sequence from the live map (serialize-time step).
    pub fn sync_to_records(&mut self) {
        self.items = to_records(&self.map);
    }

    /// Rebuild the live map from the record sequence (deserialize-time step).
    pub fn sync_from_records(&mut self) {
        self.map = from_records(&self.items);
    }
}

impl<T: Clone> From<HashMap<String, T>> for RecordMap<T> {
    fn from(map: HashMap<String, T>) -> Self {
        Self { items: Vec::new(), map }
    }
}
