//! The traversal engine over a geometry backend.
//!
//! [`GeomEngine`] wraps any [`VolumeNavigator`] and answers the analyzer
//! queries: path lengths per isotope, vertex draws, maximum path length
//! scans. All knobs live in [`EngineConfig`]; the registered isotope set
//! is fixed when the engine is built.
//!
//! ## Example
//!
//! ```ignore
//! let tree = BoxTree::from_json_file("detector.json")?;
//! let engine = GeomEngine::new(tree);
//! let ray = Ray::new(DVec3::new(-20.0, 0.0, 0.0), DVec3::X)?;
//! let lengths = engine.path_lengths(ray)?;
//! ```

use rand::{Rng, RngCore};

use crate::core::estimator;
use crate::core::marcher::{CapBehavior, March, Ray, DEFAULT_CROSSING_CAP};
use crate::core::paths::PathLengthList;
use crate::core::traits::GeomAnalyzer;
use crate::core::vertex::{self, VertexSample};
use crate::geom::VolumeNavigator;
use crate::material::{IsotopeId, IsotopeSet, Material, MaterialHandle};
use crate::util::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// How a mixture's constituents share one traversed segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MixturePolicy {
    /// Every constituent is attributed the full segment, so a mixture's
    /// entries do not sum to the geometric segment length. This mirrors
    /// the long-standing behavior of production detector scans and is
    /// the default.
    #[default]
    FullStepPerConstituent,
    /// Split the segment by mass fraction; entries sum to the segment's
    /// weighted length.
    SplitByMassFraction,
}

impl MixturePolicy {
    /// Weight one constituent contributes per unit segment length.
    #[inline]
    pub fn constituent_weight(self, density: f64, fraction: f64) -> f64 {
        match self {
            Self::FullStepPerConstituent => density,
            Self::SplitByMassFraction => density * fraction,
        }
    }
}

/// Engine knobs; the defaults match the production scan parameters.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Segment attribution for mixtures.
    pub mixture_policy: MixturePolicy,
    /// Crossing budget for full traversals; overrun is a fatal error.
    pub max_crossings: usize,
    /// Crossing budget for estimator probes; overrun stops quietly.
    pub probe_crossings: usize,
    /// Random surface points per bounding-box face in a scan.
    pub surface_points: usize,
    /// Random inward directions per surface point in a scan.
    pub surface_rays: usize,
    /// Fixed re-march step of the vertex sampler.
    pub vertex_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mixture_policy: MixturePolicy::default(),
            max_crossings: DEFAULT_CROSSING_CAP,
            probe_crossings: 100,
            surface_points: 200,
            surface_rays: 200,
            vertex_step: 1e-3,
        }
    }
}

/// Material lookup that treats an unanswerable handle as the fatal
/// configuration error it is.
pub(crate) fn resolve<N: VolumeNavigator + ?Sized>(
    nav: &N,
    handle: MaterialHandle,
) -> Result<&Material> {
    nav.material(handle)
        .ok_or_else(|| Error::MissingMaterial(format!("handle {:?}", handle)))
}

// ============================================================================
// Engine
// ============================================================================

/// Traversal engine over a volume-hierarchy backend.
pub struct GeomEngine<N: VolumeNavigator> {
    nav: N,
    config: EngineConfig,
    isotopes: IsotopeSet,
}

impl<N: VolumeNavigator> GeomEngine<N> {
    /// Engine with default configuration.
    pub fn new(nav: N) -> Self {
        Self::with_config(nav, EngineConfig::default())
    }

    /// Engine with explicit configuration.
    pub fn with_config(nav: N, config: EngineConfig) -> Self {
        let isotopes = nav.materials().isotopes();
        tracing::debug!(
            isotopes = isotopes.len(),
            materials = nav.materials().len(),
            "traversal engine ready"
        );
        Self {
            nav,
            config,
            isotopes,
        }
    }

    /// The wrapped backend.
    pub fn navigator(&self) -> &N {
        &self.nav
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Density-weighted path length per registered isotope along `ray`.
    pub fn path_lengths(&self, ray: Ray) -> Result<PathLengthList> {
        let mut list = PathLengthList::new(&self.isotopes);
        let mut march = March::capped(
            &self.nav,
            ray,
            self.config.max_crossings,
            CapBehavior::Fatal,
        );
        while let Some(seg) = march.next_crossing()? {
            let material = resolve(&self.nav, seg.material)?;
            for &(id, fraction) in material.composition() {
                list.add(
                    id,
                    seg.length
                        * self
                            .config
                            .mixture_policy
                            .constituent_weight(material.density(), fraction),
                );
            }
        }
        Ok(list)
    }

    /// Draw an interaction point for `target` on `ray`.
    pub fn sample_vertex<R: Rng + ?Sized>(
        &self,
        ray: Ray,
        target: IsotopeId,
        rng: &mut R,
    ) -> Result<VertexSample> {
        vertex::sample(&self.nav, &self.config, ray, target, rng)
    }

    /// Scan the bounding surface for per-isotope maximum path lengths.
    pub fn max_path_lengths<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PathLengthList> {
        estimator::estimate(&self.nav, &self.config, &self.isotopes, rng)
    }

    /// Parallel scan (rayon over faces and surface points), reproducible
    /// for a fixed `seed`.
    pub fn max_path_lengths_par(&self, seed: u64) -> Result<PathLengthList> {
        estimator::estimate_par(&self.nav, &self.config, &self.isotopes, seed)
    }
}

impl<N: VolumeNavigator> GeomAnalyzer for GeomEngine<N> {
    fn isotopes(&self) -> &IsotopeSet {
        &self.isotopes
    }

    fn path_lengths(&self, ray: Ray) -> Result<PathLengthList> {
        GeomEngine::path_lengths(self, ray)
    }

    fn sample_vertex(
        &self,
        ray: Ray,
        target: IsotopeId,
        rng: &mut dyn RngCore,
    ) -> Result<VertexSample> {
        GeomEngine::sample_vertex(self, ray, target, rng)
    }

    fn max_path_length(&self, target: IsotopeId, rng: &mut dyn RngCore) -> Result<f64> {
        Ok(GeomEngine::max_path_lengths(self, rng)?.get(target))
    }

    fn max_path_lengths(&self, rng: &mut dyn RngCore) -> Result<PathLengthList> {
        GeomEngine::max_path_lengths(self, rng)
    }
}
