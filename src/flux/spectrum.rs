//! Binned energy spectra for flux drivers.
//!
//! A spectrum is a plain histogram: ascending bin edges plus one content
//! per bin. Sampling picks a bin by cumulative weight (content times bin
//! width) and draws uniformly inside it. Named spectra load from a JSON
//! file:
//!
//! ```json
//! {
//!   "spectra": {
//!     "numu":    { "edges": [0.0, 1.0, 2.0, 5.0], "contents": [0.2, 1.0, 0.4] },
//!     "numubar": { "edges": [0.0, 1.0, 2.0, 5.0], "contents": [0.1, 0.3, 0.1] }
//!   }
//! }
//! ```

use std::path::Path;

use rand::Rng;
use serde_json::Value;

use crate::util::{Error, Result};

/// A binned energy spectrum.
#[derive(Clone, Debug)]
pub struct Spectrum {
    /// Ascending bin edges, one more than there are bins.
    edges: Vec<f64>,
    /// Cumulative bin weights (content times width).
    cumulative: Vec<f64>,
}

impl Spectrum {
    /// Build from edges and per-bin contents.
    pub fn new(edges: Vec<f64>, contents: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 || edges.len() != contents.len() + 1 {
            return Err(Error::InvalidFlux(format!(
                "spectrum needs n+1 edges for n bins, got {} edges / {} bins",
                edges.len(),
                contents.len()
            )));
        }
        if edges.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::InvalidFlux("spectrum edges must ascend".into()));
        }
        if contents.iter().any(|&c| !(c >= 0.0) || !c.is_finite()) {
            return Err(Error::InvalidFlux(
                "spectrum contents must be finite and non-negative".into(),
            ));
        }

        let mut cumulative = Vec::with_capacity(contents.len());
        let mut running = 0.0;
        for (i, &content) in contents.iter().enumerate() {
            running += content * (edges[i + 1] - edges[i]);
            cumulative.push(running);
        }
        if running <= 0.0 {
            return Err(Error::InvalidFlux("spectrum integrates to zero".into()));
        }

        Ok(Self { edges, cumulative })
    }

    /// Integral over all bins; species weights in a multi-species flux.
    #[inline]
    pub fn integral(&self) -> f64 {
        *self.cumulative.last().unwrap_or(&0.0)
    }

    /// Upper edge of the last bin.
    #[inline]
    pub fn max_energy(&self) -> f64 {
        *self.edges.last().unwrap_or(&0.0)
    }

    /// Draw one energy.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = rng.gen::<f64>() * self.integral();
        let bin = self
            .cumulative
            .partition_point(|&c| c <= u)
            .min(self.cumulative.len() - 1);
        let lo = self.edges[bin];
        let hi = self.edges[bin + 1];
        lo + (hi - lo) * rng.gen::<f64>()
    }

    /// Parse one spectrum from its JSON object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let edges = f64_array(value, "edges")?;
        let contents = f64_array(value, "contents")?;
        Self::new(edges, contents)
    }

    /// Load every named spectrum from a flux file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<(String, Spectrum)>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let doc: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let spectra = doc
            .get("spectra")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::InvalidFlux("flux file has no 'spectra' object".into()))?;

        let mut out = Vec::with_capacity(spectra.len());
        for (name, value) in spectra {
            out.push((name.clone(), Spectrum::from_json(value)?));
        }
        tracing::info!(spectra = out.len(), "loaded flux spectra from {}", path.display());
        Ok(out)
    }
}

fn f64_array(value: &Value, key: &str) -> Result<Vec<f64>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidFlux(format!("spectrum has no '{}' array", key)))?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| Error::InvalidFlux(format!("non-numeric entry in '{}'", key)))
        })
        .collect()
}
