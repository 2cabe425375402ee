//! The analyzer contract consumed by event-generation drivers.
//!
//! Everything a driver needs from a geometry is behind [`GeomAnalyzer`]:
//! per-isotope path lengths along a flux ray, vertex draws, and maximum
//! path lengths for probability normalization. The trait is object-safe
//! so drivers hold a `Box<dyn GeomAnalyzer>` and swap the full traversal
//! engine for the point analyzer without caring which is which; random
//! sources cross the boundary as `&mut dyn RngCore`.

use rand::RngCore;

use crate::core::marcher::Ray;
use crate::core::paths::PathLengthList;
use crate::core::vertex::VertexSample;
use crate::material::{IsotopeId, IsotopeSet};
use crate::util::Result;

/// Geometry analyzer: the query surface of a traversal engine.
///
/// Implementations keep no per-call state; every method takes the full
/// ray and an explicit generator, so one analyzer instance can serve a
/// whole job. All sampling is reproducible under a seeded generator.
pub trait GeomAnalyzer: Send + Sync {
    /// Isotopes this geometry can present as interaction targets.
    fn isotopes(&self) -> &IsotopeSet;

    /// Density-weighted path length per registered isotope along `ray`.
    /// A ray that misses the geometry yields an all-zero list.
    fn path_lengths(&self, ray: Ray) -> Result<PathLengthList>;

    /// Draw an interaction point for `target` on `ray`, weighted by
    /// traversed target mass. Non-crossing rays report a miss, not an
    /// error.
    fn sample_vertex(
        &self,
        ray: Ray,
        target: IsotopeId,
        rng: &mut dyn RngCore,
    ) -> Result<VertexSample>;

    /// Maximum density-weighted path length for `target` over the whole
    /// geometry surface. Zero for isotopes the geometry does not contain.
    fn max_path_length(&self, target: IsotopeId, rng: &mut dyn RngCore) -> Result<f64>;

    /// Maximum density-weighted path lengths for every registered isotope
    /// in one scan.
    fn max_path_lengths(&self, rng: &mut dyn RngCore) -> Result<PathLengthList>;
}
