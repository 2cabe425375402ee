//! Flux drivers - where the neutrinos come from.
//!
//! This module provides:
//! - [`FluxDriver`] - the driver contract: draw the next flux neutrino
//! - [`FluxNeutrino`] - species, energy, origin and direction of one draw
//! - [`MonoFlux`] - fixed single-ray gun
//! - [`CylindFlux`] - beam-axis flux with per-species histogram spectra
//! - [`Spectrum`] - binned energy spectrum sampled by cumulative weight
//! - [`FluxSpec`] - parsed command-line flux description
//!
//! ## Example
//!
//! ```ignore
//! let spec = FluxSpec::parse("14[2.5]")?;
//! let mut flux = spec.build(DVec3::new(0.0, 0.0, -30.0), DVec3::Z, None)?;
//! let nu = flux.generate(&mut rng).unwrap();
//! ```

use std::path::PathBuf;

use rand::RngCore;

use crate::core::Ray;
use crate::util::{DVec3, Error, Result};

mod cylind;
mod mono;
mod spectrum;

pub use cylind::CylindFlux;
pub use mono::MonoFlux;
pub use spectrum::Spectrum;

/// One neutrino drawn from a flux driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluxNeutrino {
    /// PDG species code.
    pub pdg: i32,
    /// Energy in GeV.
    pub energy: f64,
    /// Ray origin.
    pub origin: DVec3,
    /// Unit flight direction.
    pub dir: DVec3,
}

impl FluxNeutrino {
    /// The geometry ray this neutrino flies along.
    pub fn ray(&self) -> Result<Ray> {
        Ray::new(self.origin, self.dir)
    }
}

/// A source of flux neutrinos.
pub trait FluxDriver: Send {
    /// Species this driver can produce.
    fn flux_particles(&self) -> &[i32];

    /// Highest energy this driver can produce; probability scales are
    /// computed against it.
    fn max_energy(&self) -> f64;

    /// Draw the next flux neutrino; None once the source is exhausted.
    fn generate(&mut self, rng: &mut dyn RngCore) -> Option<FluxNeutrino>;
}

/// Parsed `-f` flux description.
///
/// Two syntaxes: monoenergetic `PDG[ENERGY]` (e.g. `14[2.5]`), or a
/// spectra file followed by `PDG[NAME]` species bindings
/// (`flux.json,14[numu],-14[numubar]`).
#[derive(Clone, Debug, PartialEq)]
pub enum FluxSpec {
    /// One species at one energy.
    Mono { pdg: i32, energy: f64 },
    /// Named histogram spectra from a file, bound to species codes.
    Histogram {
        path: PathBuf,
        species: Vec<(i32, String)>,
    },
}

impl FluxSpec {
    /// Parse the command-line syntax.
    pub fn parse(spec: &str) -> Result<Self> {
        let entries: Vec<&str> = spec.split(',').map(str::trim).collect();
        if entries.is_empty() || entries[0].is_empty() {
            return Err(Error::InvalidFlux("empty flux description".into()));
        }

        if entries.len() == 1 {
            let (pdg, energy) = split_bracketed(entries[0])?;
            let energy: f64 = energy
                .parse()
                .map_err(|_| Error::InvalidFlux(format!("bad mono energy '{}'", energy)))?;
            return Ok(Self::Mono { pdg, energy });
        }

        let path = PathBuf::from(entries[0]);
        let mut species = Vec::with_capacity(entries.len() - 1);
        for entry in &entries[1..] {
            let (pdg, name) = split_bracketed(entry)?;
            species.push((pdg, name.to_string()));
        }
        Ok(Self::Histogram { path, species })
    }

    /// Build the driver, placing ray origins at `start` along `dir`, with
    /// an optional transverse smear radius for histogram fluxes.
    pub fn build(
        &self,
        start: DVec3,
        dir: DVec3,
        radius: Option<f64>,
    ) -> Result<Box<dyn FluxDriver>> {
        match self {
            Self::Mono { pdg, energy } => {
                Ok(Box::new(MonoFlux::new(*pdg, *energy, start, dir)?))
            }
            Self::Histogram { path, species } => {
                let spectra = Spectrum::load_file(path)?;
                let mut flux = CylindFlux::new();
                flux.set_beam_direction(dir)?;
                flux.set_beam_spot(start);
                flux.set_transverse_radius(radius);
                for (pdg, name) in species {
                    let spectrum = spectra
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, s)| s.clone())
                        .ok_or_else(|| {
                            Error::InvalidFlux(format!(
                                "flux file has no spectrum named '{}'",
                                name
                            ))
                        })?;
                    flux.add_spectrum(*pdg, spectrum)?;
                }
                Ok(Box::new(flux))
            }
        }
    }
}

/// Split `LEFT[INNER]` into a parsed species code and the inner text.
fn split_bracketed(entry: &str) -> Result<(i32, &str)> {
    let (code, rest) = entry
        .split_once('[')
        .ok_or_else(|| Error::InvalidFlux(format!("expected CODE[...], got '{}'", entry)))?;
    let inner = rest
        .strip_suffix(']')
        .ok_or_else(|| Error::InvalidFlux(format!("unterminated bracket in '{}'", entry)))?;
    let pdg: i32 = code
        .trim()
        .parse()
        .map_err(|_| Error::InvalidFlux(format!("bad species code '{}'", code)))?;
    Ok((pdg, inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mono() {
        assert_eq!(
            FluxSpec::parse("14[2.5]").unwrap(),
            FluxSpec::Mono { pdg: 14, energy: 2.5 }
        );
        assert_eq!(
            FluxSpec::parse("-14[0.8]").unwrap(),
            FluxSpec::Mono { pdg: -14, energy: 0.8 }
        );
    }

    #[test]
    fn test_parse_histogram() {
        let spec = FluxSpec::parse("flux.json,14[numu],-14[numubar]").unwrap();
        match spec {
            FluxSpec::Histogram { path, species } => {
                assert_eq!(path, PathBuf::from("flux.json"));
                assert_eq!(
                    species,
                    vec![(14, "numu".to_string()), (-14, "numubar".to_string())]
                );
            }
            other => panic!("parsed {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(FluxSpec::parse("").is_err());
        assert!(FluxSpec::parse("14").is_err());
        assert!(FluxSpec::parse("14[abc]").is_err());
        assert!(FluxSpec::parse("flux.json,notbracketed").is_err());
    }

    #[test]
    fn test_build_mono() {
        let spec = FluxSpec::parse("14[2.5]").unwrap();
        let mut flux = spec.build(DVec3::new(0.0, 0.0, -30.0), DVec3::Z, None).unwrap();
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let nu = flux.generate(&mut rng).unwrap();
        assert_eq!(nu.pdg, 14);
        assert_eq!(nu.origin.z, -30.0);
    }
}
