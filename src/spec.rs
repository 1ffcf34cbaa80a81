//! In-memory model of install tasks.
//!
//! An [`InstallTask`] owns its own [`OptionMap`]. Maps are merged by copy, so
//! consuming an entry from one task never reaches a sibling task or the
//! global options it was derived from.

use std::collections::BTreeMap;

use serde::Serialize;

/// Value of a single build option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A value, e.g. a path or directory name.
    Value(String),
    /// A bare flag (`--key`).
    Flag,
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Value(s) => Some(s),
            OptionValue::Flag => None,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, OptionValue::Flag)
    }
}

impl Serialize for OptionValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Value(s) => serializer.serialize_str(s),
            OptionValue::Flag => serializer.serialize_bool(true),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Value(s.to_string())
    }
}

/// Ordered key -> value options with unique keys.
///
/// Replacing an existing key keeps its original position, so iteration order
/// is the order in which keys were first declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Merge `other` into this map. Later keys overwrite, new keys append.
    pub fn extend(&mut self, other: &OptionMap) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Copy of this map with `other` merged in. Neither input is modified.
    pub fn merged(&self, other: &OptionMap) -> OptionMap {
        let mut merged = self.clone();
        merged.extend(other);
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys whose value is a bare flag, in map order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, v)| v.is_flag()).map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One package's fully resolved fetch/build instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallTask {
    /// Locator of the archive to fetch (usually a URL).
    pub source: String,
    /// Global options merged with this task's local flags.
    pub options: OptionMap,
    /// Destination path (relative to the extraction root) -> patch body.
    pub patches: BTreeMap<String, String>,
}

impl InstallTask {
    pub fn new(source: impl Into<String>, options: OptionMap) -> Self {
        Self {
            source: source.into(),
            options,
            patches: BTreeMap::new(),
        }
    }

    /// Archive file name: the last path segment of the source locator.
    pub fn archive_name(&self) -> &str {
        let trimmed = self.source.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}
