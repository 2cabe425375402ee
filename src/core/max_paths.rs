//! Persisted maximum path lengths.
//!
//! A geometry scan is the expensive part of configuring a job, so its
//! result can be written to a JSON file once and handed to later runs.
//! The file records the scan parameters alongside the per-isotope maxima:
//!
//! ```json
//! {
//!   "surface_points": 200,
//!   "surface_rays": 200,
//!   "max_path_lengths": { "1000080160": 34.2, "1000010010": 34.2 }
//! }
//! ```

use std::path::Path;

use serde_json::{json, Value};

use crate::core::paths::PathLengthList;
use crate::material::IsotopeId;
use crate::util::{Error, Result};

/// Per-isotope maximum density-weighted path lengths, with the scan
/// parameters that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxPathTable {
    lengths: PathLengthList,
    surface_points: usize,
    surface_rays: usize,
}

impl MaxPathTable {
    /// Wrap a freshly scanned list.
    pub fn from_lengths(lengths: PathLengthList, surface_points: usize, surface_rays: usize) -> Self {
        Self {
            lengths,
            surface_points,
            surface_rays,
        }
    }

    /// Maximum for `target`; zero for isotopes the table does not know.
    #[inline]
    pub fn get(&self, target: IsotopeId) -> f64 {
        self.lengths.get(target)
    }

    /// The underlying per-isotope list.
    pub fn lengths(&self) -> &PathLengthList {
        &self.lengths
    }

    /// Sum over every isotope's maximum.
    pub fn total(&self) -> f64 {
        self.lengths.total()
    }

    /// True if the table carries no entries.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Surface points per face used by the producing scan.
    pub fn surface_points(&self) -> usize {
        self.surface_points
    }

    /// Rays per surface point used by the producing scan.
    pub fn surface_rays(&self) -> usize {
        self.surface_rays
    }

    /// Table as a JSON document.
    pub fn to_json(&self) -> Value {
        json!({
            "surface_points": self.surface_points,
            "surface_rays": self.surface_rays,
            "max_path_lengths": self.lengths.to_json(),
        })
    }

    /// Parse a table from a JSON document.
    pub fn from_json(value: &Value) -> Result<Self> {
        let lengths = value
            .get("max_path_lengths")
            .ok_or_else(|| Error::invalid("table has no 'max_path_lengths' object"))?;
        Ok(Self {
            lengths: PathLengthList::from_json(lengths)?,
            surface_points: value
                .get("surface_points")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize,
            surface_rays: value
                .get("surface_rays")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize,
        })
    }

    /// Load a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_json(&serde_json::from_str(&text)?)?;
        tracing::info!(
            isotopes = table.lengths.len(),
            "loaded max path lengths from {}",
            path.display()
        );
        Ok(table)
    }

    /// Write the table to a file, pretty-printed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, text)?;
        tracing::info!(
            isotopes = self.lengths.len(),
            "wrote max path lengths to {}",
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::IsotopeSet;

    fn table() -> MaxPathTable {
        let set: IsotopeSet = [IsotopeId::new(16, 8), IsotopeId::new(1, 1)]
            .into_iter()
            .collect();
        let mut lengths = PathLengthList::new(&set);
        lengths.set(IsotopeId::new(16, 8), 34.2);
        lengths.set(IsotopeId::new(1, 1), 34.2);
        MaxPathTable::from_lengths(lengths, 200, 200)
    }

    #[test]
    fn test_lookup() {
        let t = table();
        assert_eq!(t.get(IsotopeId::new(16, 8)), 34.2);
        assert_eq!(t.get(IsotopeId::new(56, 26)), 0.0);
        assert!((t.total() - 68.4).abs() < 1e-12);
    }

    #[test]
    fn test_json_round_trip() {
        let t = table();
        let back = MaxPathTable::from_json(&t.to_json()).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.surface_points(), 200);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maxpl.json");

        let t = table();
        t.save(&path).unwrap();
        let back = MaxPathTable::load(&path).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            MaxPathTable::load("/nonexistent/maxpl.json"),
            Err(Error::FileNotFound(_))
        ));
    }
}
