//! Geometry-less analyzer over a fixed target mix.
//!
//! Jobs that do not care about a detector layout declare their targets
//! directly, e.g. `1000080160[0.95],1000010010[0.05]`. Path lengths are
//! then just the declared weight fractions (for any ray), the vertex is
//! the flux ray's origin, and no scan is ever needed. Implements the same
//! [`GeomAnalyzer`] surface as the full engine so drivers cannot tell the
//! difference.

use rand::RngCore;

use crate::core::marcher::Ray;
use crate::core::paths::PathLengthList;
use crate::core::traits::GeomAnalyzer;
use crate::core::vertex::VertexSample;
use crate::material::{IsotopeId, IsotopeSet};
use crate::util::{Error, Result};

/// Analyzer over a fixed isotope mix at a point.
#[derive(Clone, Debug)]
pub struct PointAnalyzer {
    /// Sorted by isotope code.
    fractions: Vec<(IsotopeId, f64)>,
    isotopes: IsotopeSet,
}

impl PointAnalyzer {
    /// Build from (isotope, weight fraction) pairs.
    pub fn new(parts: impl IntoIterator<Item = (IsotopeId, f64)>) -> Result<Self> {
        let mut fractions: Vec<(IsotopeId, f64)> = parts.into_iter().collect();
        if fractions.is_empty() {
            return Err(Error::invalid("target mix declares no isotopes"));
        }
        fractions.sort_by_key(|p| p.0);
        for pair in fractions.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::invalid(format!(
                    "target mix lists {} twice",
                    pair[0].0
                )));
            }
        }
        for &(id, fraction) in &fractions {
            if !(fraction > 0.0 && fraction.is_finite()) {
                return Err(Error::invalid(format!(
                    "target mix fraction for {} must be positive, got {}",
                    id, fraction
                )));
            }
        }
        let isotopes = fractions.iter().map(|p| p.0).collect();
        Ok(Self {
            fractions,
            isotopes,
        })
    }

    /// Parse the command-line mix syntax: comma-separated `code[fraction]`
    /// entries; a bare `code` means fraction 1.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = Vec::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (code_str, fraction) = match entry.split_once('[') {
                Some((code, rest)) => {
                    let inner = rest.strip_suffix(']').ok_or_else(|| {
                        Error::invalid(format!("unterminated fraction in '{}'", entry))
                    })?;
                    let fraction: f64 = inner.parse().map_err(|_| {
                        Error::invalid(format!("bad fraction '{}' in target mix", inner))
                    })?;
                    (code, fraction)
                }
                None => (entry, 1.0),
            };
            let code: i32 = code_str
                .trim()
                .parse()
                .map_err(|_| Error::invalid(format!("bad isotope code '{}'", code_str)))?;
            let id = IsotopeId::from_code(code).ok_or(Error::UnknownIsotope(code))?;
            parts.push((id, fraction));
        }
        Self::new(parts)
    }

    /// Weight fraction of `target`; zero if it is not in the mix.
    pub fn fraction(&self, target: IsotopeId) -> f64 {
        match self.fractions.binary_search_by_key(&target, |p| p.0) {
            Ok(pos) => self.fractions[pos].1,
            Err(_) => 0.0,
        }
    }
}

impl GeomAnalyzer for PointAnalyzer {
    fn isotopes(&self) -> &IsotopeSet {
        &self.isotopes
    }

    fn path_lengths(&self, _ray: Ray) -> Result<PathLengthList> {
        let mut list = PathLengthList::new(&self.isotopes);
        for &(id, fraction) in &self.fractions {
            list.set(id, fraction);
        }
        Ok(list)
    }

    fn sample_vertex(
        &self,
        ray: Ray,
        target: IsotopeId,
        _rng: &mut dyn RngCore,
    ) -> Result<VertexSample> {
        if self.fraction(target) > 0.0 {
            Ok(VertexSample::Found(ray.origin()))
        } else {
            Ok(VertexSample::NotInPath)
        }
    }

    fn max_path_length(&self, target: IsotopeId, _rng: &mut dyn RngCore) -> Result<f64> {
        Ok(self.fraction(target))
    }

    fn max_path_lengths(&self, _rng: &mut dyn RngCore) -> Result<PathLengthList> {
        let mut list = PathLengthList::new(&self.isotopes);
        for &(id, fraction) in &self.fractions {
            list.set(id, fraction);
        }
        Ok(list)
    }
}
