//! Monte-Carlo job driver.
//!
//! [`McJob`] owns a boxed [`GeomAnalyzer`] and a boxed [`FluxDriver`] and
//! turns flux neutrinos into accepted events. The interaction model is a
//! deliberate stand-in for an external physics generator: a flat toy
//! cross-section per nucleon, linear in energy, so the per-isotope weight
//! of a candidate is its density-weighted path length times sigma0 times
//! E. The global probability scale is fixed at configure time from the
//! maximum path lengths and the flux's maximum energy, exactly the "one
//! probability scale for the whole job" scheme of production drivers, and
//! a supplied max-path table skips the geometry scan entirely.
//!
//! ## Example
//!
//! ```ignore
//! let mut job = McJob::new(Box::new(engine), flux);
//! job.configure(&mut rng)?;
//! while let Some(event) = job.next_event(run, index, &mut rng)? {
//!     writeln!(out, "{}", event.to_json())?;
//!     if event.status == EventStatus::Generated { index += 1; }
//!     if index == wanted { break; }
//! }
//! ```

use std::time::Instant;

use rand::{Rng, RngCore};

use crate::core::{GeomAnalyzer, PathLengthList, VertexSample};
use crate::event::{EventRecord, EventStatus, PauliBlocker};
use crate::flux::FluxDriver;
use crate::material::IsotopeId;
use crate::util::{Error, Result};

/// Flux draws a single `next_event` call may consume before giving up.
pub const DEFAULT_RETRY_CAP: usize = 100_000;

/// Progress and end-of-job statistics.
#[derive(Debug)]
pub struct McJobMonitor {
    trials: u64,
    accepted: u64,
    blocked: u64,
    started: Instant,
    report_every: u64,
}

impl McJobMonitor {
    fn new() -> Self {
        Self {
            trials: 0,
            accepted: 0,
            blocked: 0,
            started: Instant::now(),
            report_every: 100,
        }
    }

    /// Flux neutrinos thrown so far.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Events accepted (and not blocked) so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Candidates rejected by the Pauli blocker.
    pub fn blocked(&self) -> u64 {
        self.blocked
    }

    /// Wall time since the job started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn record_accept(&mut self) {
        self.accepted += 1;
        if self.report_every > 0 && self.accepted % self.report_every == 0 {
            tracing::info!(
                accepted = self.accepted,
                trials = self.trials,
                blocked = self.blocked,
                "generation progress"
            );
        }
    }

    /// Log the end-of-job summary.
    pub fn summarize(&self) {
        let secs = self.elapsed_secs();
        tracing::info!(
            trials = self.trials,
            accepted = self.accepted,
            blocked = self.blocked,
            elapsed_secs = format!("{:.2}", secs).as_str(),
            rate_hz = format!("{:.1}", self.accepted as f64 / secs.max(1e-9)).as_str(),
            "job complete"
        );
    }
}

/// Event-generation driver over one geometry and one flux.
pub struct McJob {
    geom: Box<dyn GeomAnalyzer>,
    flux: Box<dyn FluxDriver>,
    blocker: PauliBlocker,
    max_paths: Option<PathLengthList>,
    /// Toy cross-section scale per nucleon.
    sigma0: f64,
    prob_scale: f64,
    retry_cap: usize,
    monitor: McJobMonitor,
}

impl McJob {
    /// A job over the given analyzer and flux; call [`configure`] before
    /// generating.
    ///
    /// [`configure`]: McJob::configure
    pub fn new(geom: Box<dyn GeomAnalyzer>, flux: Box<dyn FluxDriver>) -> Self {
        Self {
            geom,
            flux,
            blocker: PauliBlocker::new(),
            max_paths: None,
            sigma0: 1.0,
            prob_scale: 0.0,
            retry_cap: DEFAULT_RETRY_CAP,
            monitor: McJobMonitor::new(),
        }
    }

    /// Supply precomputed maximum path lengths; configure will then skip
    /// the geometry scan.
    pub fn use_max_paths(&mut self, lengths: PathLengthList) {
        self.max_paths = Some(lengths);
    }

    /// Override the flux-draw budget per event.
    pub fn set_retry_cap(&mut self, cap: usize) {
        self.retry_cap = cap;
    }

    /// Job statistics.
    pub fn monitor(&self) -> &McJobMonitor {
        &self.monitor
    }

    /// Probability scale fixed by [`configure`]; zero beforehand.
    ///
    /// [`configure`]: McJob::configure
    pub fn prob_scale(&self) -> f64 {
        self.prob_scale
    }

    /// Fix the global probability scale: scan the geometry for maximum
    /// path lengths unless a table was supplied, then fold in the flux's
    /// maximum energy.
    pub fn configure(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        let max_paths = match self.max_paths.take() {
            Some(lengths) => {
                tracing::info!("using supplied max path lengths, skipping the geometry scan");
                lengths
            }
            None => {
                tracing::info!("scanning geometry for max path lengths");
                self.geom.max_path_lengths(&mut *rng)?
            }
        };

        let e_max = self.flux.max_energy();
        self.prob_scale = max_paths.total() * self.sigma0 * e_max;
        if !(self.prob_scale > 0.0) {
            return Err(Error::invalid(
                "probability scale is zero: empty geometry or zero-energy flux",
            ));
        }
        tracing::info!(
            prob_scale = self.prob_scale,
            e_max,
            isotopes = max_paths.len(),
            "job configured"
        );
        self.max_paths = Some(max_paths);
        Ok(())
    }

    /// Generate the next candidate event. `Ok(None)` means the flux is
    /// exhausted; blocked candidates are returned flagged so the caller
    /// can keep or drop them, and do not count as generated.
    pub fn next_event(
        &mut self,
        run: u32,
        index: u64,
        rng: &mut dyn RngCore,
    ) -> Result<Option<EventRecord>> {
        if self.prob_scale <= 0.0 {
            return Err(Error::invalid("job is not configured"));
        }

        let mut attempts = 0usize;
        loop {
            attempts += 1;
            if attempts > self.retry_cap {
                return Err(Error::GenerationStalled(self.retry_cap));
            }

            let Some(nu) = self.flux.generate(&mut *rng) else {
                return Ok(None);
            };
            self.monitor.trials += 1;

            let ray = nu.ray()?;
            let lengths = self.geom.path_lengths(ray)?;
            let total_weight: f64 = lengths
                .iter()
                .map(|(_, pl)| pl * self.sigma0 * nu.energy)
                .sum();
            if total_weight <= 0.0 {
                // missed the detector
                continue;
            }

            let p_interact = (total_weight / self.prob_scale).min(1.0);
            if rng.gen::<f64>() >= p_interact {
                continue;
            }

            let target = pick_target(&lengths, self.sigma0, nu.energy, total_weight, &mut *rng);
            let vertex = match self.geom.sample_vertex(ray, target, &mut *rng)? {
                VertexSample::Found(point) => point,
                outcome => {
                    // weight said the target is on the ray; a miss here is
                    // float residue on a grazing segment
                    tracing::warn!(?outcome, code = target.code(), "vertex draw missed, retrying");
                    continue;
                }
            };

            // toy recoil: a nucleon picked by abundance, momentum uniform
            // up to the probe energy
            let nucleon = if rng.gen::<f64>() * target.a() as f64 > target.z() as f64 {
                pdg::NEUTRON
            } else {
                pdg::PROTON
            };
            let recoil_p = rng.gen::<f64>() * nu.energy;
            let status = if self.blocker.is_blocked(target, nucleon, recoil_p)? {
                self.monitor.blocked += 1;
                EventStatus::PauliBlocked
            } else {
                self.monitor.record_accept();
                EventStatus::Generated
            };

            return Ok(Some(EventRecord {
                run,
                index,
                probe: nu.pdg,
                energy: nu.energy,
                target,
                vertex,
                weight: 1.0,
                status,
            }));
        }
    }
}

/// Draw a target isotope proportionally to its interaction weight.
fn pick_target(
    lengths: &PathLengthList,
    sigma0: f64,
    energy: f64,
    total_weight: f64,
    rng: &mut dyn RngCore,
) -> IsotopeId {
    let mut u = rng.gen::<f64>() * total_weight;
    let mut last = None;
    for (id, pl) in lengths.iter() {
        let w = pl * sigma0 * energy;
        if w <= 0.0 {
            continue;
        }
        last = Some(id);
        u -= w;
        if u < 0.0 {
            return id;
        }
    }
    // float residue lands on the heaviest-weighted tail entry
    last.unwrap_or(IsotopeId::new(1, 1))
}
