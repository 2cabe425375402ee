//! Per-isotope path length accumulation.
//!
//! A [`PathLengthList`] is keyed by the registered isotope set of a
//! geometry: one slot per isotope, created zeroed, reset before every new
//! ray. Adding a length for an id outside the registered set logs a
//! warning and drops the value; the registered set is fixed at geometry
//! load and nothing downstream may invent new keys.

use serde_json::{json, Value};

use crate::material::{IsotopeId, IsotopeSet};
use crate::util::{Error, Result};

/// IsotopeId -> accumulated (density-weighted) path length.
#[derive(Clone, Debug, PartialEq)]
pub struct PathLengthList {
    /// Sorted by isotope code, mirroring the registered set order.
    entries: Vec<(IsotopeId, f64)>,
}

impl PathLengthList {
    /// Zeroed list with one entry per registered isotope.
    pub fn new(set: &IsotopeSet) -> Self {
        Self {
            entries: set.iter().map(|id| (id, 0.0)).collect(),
        }
    }

    /// Zero every entry, keeping the key set.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.1 = 0.0;
        }
    }

    /// Add `length` to the entry for `id`. Unregistered ids are dropped
    /// with a warning.
    pub fn add(&mut self, id: IsotopeId, length: f64) {
        match self.entries.binary_search_by_key(&id, |e| e.0) {
            Ok(pos) => self.entries[pos].1 += length,
            Err(_) => {
                tracing::warn!(code = id.code(), "path length for unregistered isotope dropped");
            }
        }
    }

    /// Overwrite the entry for `id`. Unregistered ids are dropped with a
    /// warning.
    pub fn set(&mut self, id: IsotopeId, length: f64) {
        match self.entries.binary_search_by_key(&id, |e| e.0) {
            Ok(pos) => self.entries[pos].1 = length,
            Err(_) => {
                tracing::warn!(code = id.code(), "path length for unregistered isotope dropped");
            }
        }
    }

    /// Multiply the entry for `id` by `factor`; no-op for unregistered ids.
    pub fn scale(&mut self, id: IsotopeId, factor: f64) {
        if let Ok(pos) = self.entries.binary_search_by_key(&id, |e| e.0) {
            self.entries[pos].1 *= factor;
        }
    }

    /// Accumulated length for `id`; zero for anything unregistered.
    #[inline]
    pub fn get(&self, id: IsotopeId) -> f64 {
        match self.entries.binary_search_by_key(&id, |e| e.0) {
            Ok(pos) => self.entries[pos].1,
            Err(_) => 0.0,
        }
    }

    /// Sum over all entries.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.1).sum()
    }

    /// True if every entry is exactly zero.
    pub fn are_all_zero(&self) -> bool {
        self.entries.iter().all(|e| e.1 == 0.0)
    }

    /// Number of registered isotopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the key set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending isotope-code order.
    pub fn iter(&self) -> impl Iterator<Item = (IsotopeId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Entry-wise maximum with `other`, over this list's key set.
    pub fn max_merge(&mut self, other: &PathLengthList) {
        for (id, length) in &mut self.entries {
            let theirs = other.get(*id);
            if theirs > *length {
                *length = theirs;
            }
        }
    }

    /// JSON object keyed by isotope code.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (id, length) in &self.entries {
            map.insert(id.code().to_string(), json!(length));
        }
        Value::Object(map)
    }

    /// Parse a JSON object keyed by isotope code. The key set of the
    /// result is whatever the document declares.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::invalid("path length list is not a JSON object"))?;
        let mut entries = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            let code: i32 = key
                .parse()
                .map_err(|_| Error::invalid(format!("non-numeric isotope key '{}'", key)))?;
            let id = IsotopeId::from_code(code).ok_or(Error::UnknownIsotope(code))?;
            let length = val
                .as_f64()
                .ok_or_else(|| Error::invalid(format!("non-numeric path length for '{}'", key)))?;
            entries.push((id, length));
        }
        entries.sort_by_key(|e| e.0);
        Ok(Self { entries })
    }
}
