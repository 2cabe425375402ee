//! Beam-axis flux with histogram energy spectra.
//!
//! Neutrinos travel along one beam direction (+z unless told otherwise)
//! from a beam spot, optionally smeared uniformly over a transverse disk.
//! Each species carries its own [`Spectrum`]; which species fires is
//! proportional to the spectrum integrals. An optional upstream z plane
//! relocates the start of every ray, so the flux can be pushed outside
//! the detector regardless of where the beam spot sits.

use rand::{Rng, RngCore};

use crate::flux::{FluxDriver, FluxNeutrino, Spectrum};
use crate::util::{DVec3, Error, Result};

/// Cylindrical beam flux driver.
pub struct CylindFlux {
    beam_dir: DVec3,
    beam_spot: DVec3,
    transverse_radius: Option<f64>,
    upstream_z: Option<f64>,
    species: Vec<(i32, Spectrum)>,
    particles: Vec<i32>,
}

impl CylindFlux {
    /// Beam along +z from the origin, no transverse smear, no species.
    pub fn new() -> Self {
        Self {
            beam_dir: DVec3::Z,
            beam_spot: DVec3::ZERO,
            transverse_radius: None,
            upstream_z: None,
            species: Vec::new(),
            particles: Vec::new(),
        }
    }

    /// Point the beam; `dir` is normalized here.
    pub fn set_beam_direction(&mut self, dir: DVec3) -> Result<()> {
        let norm = dir.length();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(Error::DegenerateDirection(norm));
        }
        self.beam_dir = dir / norm;
        Ok(())
    }

    /// Move the beam spot.
    pub fn set_beam_spot(&mut self, spot: DVec3) {
        self.beam_spot = spot;
    }

    /// Smear ray origins uniformly over a disk of this radius, normal to
    /// the beam. None switches the smear off.
    pub fn set_transverse_radius(&mut self, radius: Option<f64>) {
        self.transverse_radius = radius.filter(|r| *r > 0.0);
    }

    /// Start every ray on this z plane (meaningful for beams along z).
    pub fn set_upstream_z(&mut self, z: f64) {
        self.upstream_z = Some(z);
    }

    /// Register a species with its energy spectrum.
    pub fn add_spectrum(&mut self, pdg: i32, spectrum: Spectrum) -> Result<()> {
        if !pdg::is_neutrino(pdg) {
            return Err(Error::InvalidFlux(format!("{} is not a neutrino code", pdg)));
        }
        if self.particles.contains(&pdg) {
            return Err(Error::InvalidFlux(format!(
                "species {} registered twice",
                pdg
            )));
        }
        self.particles.push(pdg);
        self.species.push((pdg, spectrum));
        Ok(())
    }

    /// Pick a species index proportionally to the spectrum integrals.
    fn pick_species<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let total: f64 = self.species.iter().map(|(_, s)| s.integral()).sum();
        if !(total > 0.0) {
            return None;
        }
        let mut u = rng.gen::<f64>() * total;
        for (i, (_, spectrum)) in self.species.iter().enumerate() {
            u -= spectrum.integral();
            if u < 0.0 {
                return Some(i);
            }
        }
        Some(self.species.len() - 1)
    }
}

impl Default for CylindFlux {
    fn default() -> Self {
        Self::new()
    }
}

impl FluxDriver for CylindFlux {
    fn flux_particles(&self) -> &[i32] {
        &self.particles
    }

    fn max_energy(&self) -> f64 {
        self.species
            .iter()
            .map(|(_, s)| s.max_energy())
            .fold(0.0, f64::max)
    }

    fn generate(&mut self, rng: &mut dyn RngCore) -> Option<FluxNeutrino> {
        let index = self.pick_species(&mut *rng)?;
        let (pdg, ref spectrum) = self.species[index];
        let energy = spectrum.sample(&mut *rng);

        let mut origin = self.beam_spot;
        if let Some(radius) = self.transverse_radius {
            // uniform over the disk normal to the beam
            let r = radius * rng.gen::<f64>().sqrt();
            let phi = std::f64::consts::TAU * rng.gen::<f64>();
            let (u, v) = self.beam_dir.any_orthonormal_pair();
            origin += u * (r * phi.cos()) + v * (r * phi.sin());
        }
        if let Some(z) = self.upstream_z {
            origin.z = z;
        }

        Some(FluxNeutrino {
            pdg,
            energy,
            origin,
            dir: self.beam_dir,
        })
    }
}
