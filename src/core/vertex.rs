//! Weighted vertex sampling along a ray.
//!
//! Two passes over the same ray. Pass one marches boundary to boundary and
//! totals the density-weighted length of every segment containing the
//! target isotope. Pass two draws a uniform depth inside that total and
//! re-marches with a small fixed step (never boundary-snapped),
//! accumulating weight only while the cursor sits in the target, until the
//! drawn depth is reached; the point one step back is the vertex. The
//! along-ray vertex distribution is therefore uniform in traversed target
//! mass, not in geometric distance.

use rand::Rng;

use crate::core::engine::{resolve, EngineConfig};
use crate::core::marcher::{CapBehavior, March, Ray};
use crate::geom::VolumeNavigator;
use crate::material::IsotopeId;
use crate::util::{DVec3, Error, Result};

/// Outcome of one vertex draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexSample {
    /// Interaction point on the ray.
    Found(DVec3),
    /// The ray never crossed material containing the target isotope.
    NotInPath,
    /// Target material was crossed but contributed zero weight.
    ZeroWeight,
}

impl VertexSample {
    /// True for a successful draw.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The sampled point, if any.
    pub fn position(&self) -> Option<DVec3> {
        match self {
            Self::Found(p) => Some(*p),
            _ => None,
        }
    }
}

/// Draw a vertex for `target` on `ray`; see the module doc for the law.
pub(crate) fn sample<N, R>(
    nav: &N,
    config: &EngineConfig,
    ray: Ray,
    target: IsotopeId,
    rng: &mut R,
) -> Result<VertexSample>
where
    N: VolumeNavigator + ?Sized,
    R: Rng + ?Sized,
{
    // pass one: total target weight along the ray
    let mut total = 0.0;
    let mut crossed_target = false;
    let mut march = March::capped(nav, ray, config.max_crossings, CapBehavior::Fatal);
    while let Some(seg) = march.next_crossing()? {
        let material = resolve(nav, seg.material)?;
        if let Some(fraction) = material.fraction_of(target) {
            crossed_target = true;
            total += seg.length
                * config
                    .mixture_policy
                    .constituent_weight(material.density(), fraction);
        }
    }
    if !crossed_target {
        tracing::debug!(code = target.code(), "ray does not cross the target isotope");
        return Ok(VertexSample::NotInPath);
    }
    if total <= 0.0 {
        return Ok(VertexSample::ZeroWeight);
    }

    // pass two: fixed-step walk to the drawn depth
    let goal = rng.gen_range(0.0..1.0) * total;
    let step = config.vertex_step;
    let exit_t = nav
        .bounding_box()
        .ray_range(ray.origin(), ray.dir())
        .map(|(_, t1)| t1)
        .unwrap_or(0.0);

    let mut travelled = 0.0;
    let mut weight = 0.0;
    let mut steps = 0usize;
    while weight < goal {
        travelled += step;
        steps += 1;
        if steps >= config.max_crossings {
            return Err(Error::MarchOverrun(config.max_crossings));
        }
        let point = ray.point_at(travelled);
        match nav.locate(point) {
            Some(handle) => {
                let material = resolve(nav, handle)?;
                if let Some(fraction) = material.fraction_of(target) {
                    weight += step
                        * config
                            .mixture_policy
                            .constituent_weight(material.density(), fraction);
                }
            }
            // past the far side: the remaining goal is float residue from
            // pass one, settle at the last in-geometry point
            None if travelled > exit_t => break,
            None => {}
        }
    }

    // back off one step: the point just before the threshold crossing
    Ok(VertexSample::Found(ray.point_at((travelled - step).max(0.0))))
}
