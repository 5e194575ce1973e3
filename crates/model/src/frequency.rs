use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Insertion-ordered map of signed affinity weights.
///
/// Ranking ties are broken by first-insertion order, so the order in which
/// signals were accumulated is part of the value. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyMap {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `key`, inserting it at the end when first seen.
    pub fn add(&mut self, key: &str, weight: f64) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += weight,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), weight));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    /// Weight for `key`, or 0.0 when absent.
    pub fn weight(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Keys of the `n` heaviest entries, heaviest first.
    pub fn top(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<&(String, f64)> = self.entries.iter().collect();
        // stable: equal weights keep insertion order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.into_iter().take(n).map(|(k, _)| k.clone()).collect()
    }
}

impl Serialize for FrequencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, weight) in &self.entries {
            map.serialize_entry(key, weight)?;
        }
        map.end()
    }
}

struct FrequencyMapVisitor;

impl<'de> Visitor<'de> for FrequencyMapVisitor {
    type Value = FrequencyMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of keys to signed weights")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FrequencyMap, A::Error> {
        let mut map = FrequencyMap::new();
        while let Some((key, weight)) = access.next_entry::<String, f64>()? {
            map.add(&key, weight);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for FrequencyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FrequencyMapVisitor)
    }
}
