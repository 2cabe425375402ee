//! Monoenergetic single-ray flux.

use rand::RngCore;

use crate::flux::{FluxDriver, FluxNeutrino};
use crate::util::{DVec3, Error, Result};

/// Fixed species, energy, origin and direction; fires the same neutrino
/// forever. The workhorse for tests and single-ray studies.
#[derive(Clone, Debug)]
pub struct MonoFlux {
    particles: [i32; 1],
    energy: f64,
    origin: DVec3,
    dir: DVec3,
}

impl MonoFlux {
    /// Build a ray gun; `dir` is normalized here.
    pub fn new(pdg: i32, energy: f64, origin: DVec3, dir: DVec3) -> Result<Self> {
        if !pdg::is_neutrino(pdg) {
            return Err(Error::InvalidFlux(format!("{} is not a neutrino code", pdg)));
        }
        if !(energy > 0.0 && energy.is_finite()) {
            return Err(Error::InvalidFlux(format!("bad flux energy {}", energy)));
        }
        let norm = dir.length();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(Error::DegenerateDirection(norm));
        }
        Ok(Self {
            particles: [pdg],
            energy,
            origin,
            dir: dir / norm,
        })
    }
}

impl FluxDriver for MonoFlux {
    fn flux_particles(&self) -> &[i32] {
        &self.particles
    }

    fn max_energy(&self) -> f64 {
        self.energy
    }

    fn generate(&mut self, _rng: &mut dyn RngCore) -> Option<FluxNeutrino> {
        Some(FluxNeutrino {
            pdg: self.particles[0],
            energy: self.energy,
            origin: self.origin,
            dir: self.dir,
        })
    }
}
