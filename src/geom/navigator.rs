//! Abstract contract between the traversal engine and a geometry backend.
//!
//! The backend owns the volume hierarchy; the engine only ever asks it
//! three questions: which material is at a point, how far to the next
//! boundary from a point along a direction, and what the outer bounding
//! box is. Every call carries its state explicitly - the backend keeps no
//! ambient cursor, so one instance can serve consecutive traversals and
//! be shared behind `&` across threads.

use crate::material::{Material, MaterialHandle, MaterialTable};
use crate::util::{BBox3d, DVec3};

/// One navigation step toward the next boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavStep {
    /// Distance advanced along the ray direction.
    pub length: f64,
    /// True once the step ends on the boundary of a new region. Backends
    /// that stop early (e.g. after an internal direction change) report
    /// false, and the caller must advance and ask again.
    pub crossed: bool,
}

impl NavStep {
    /// A step that reaches a region boundary.
    #[inline]
    pub fn crossing(length: f64) -> Self {
        Self {
            length,
            crossed: true,
        }
    }

    /// A partial advance that has not yet reached a new region.
    #[inline]
    pub fn partial(length: f64) -> Self {
        Self {
            length,
            crossed: false,
        }
    }

    /// No boundary ahead of the ray at all.
    #[inline]
    pub fn miss() -> Self {
        Self {
            length: f64::INFINITY,
            crossed: true,
        }
    }

    /// True if this step reports no boundary ahead.
    #[inline]
    pub fn is_miss(&self) -> bool {
        self.length.is_infinite()
    }
}

/// Read access to a volume hierarchy.
pub trait VolumeNavigator: Send + Sync {
    /// Material of the innermost volume containing `point`, or None if the
    /// point lies outside every volume.
    fn locate(&self, point: DVec3) -> Option<MaterialHandle>;

    /// Distance from `point` along (normalized) `dir` to the next boundary
    /// crossing. Returns a miss step if the ray never reaches a boundary.
    fn boundary_step(&self, point: DVec3, dir: DVec3) -> NavStep;

    /// Material behind a handle. None means the geometry is malformed
    /// (a volume was resolved whose material cannot be produced).
    fn material(&self, handle: MaterialHandle) -> Option<&Material>;

    /// Every distinct material of this geometry.
    fn materials(&self) -> &MaterialTable;

    /// Axis-aligned bounding box of the outermost (or selected top) volume.
    fn bounding_box(&self) -> BBox3d;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_step_ctors() {
        assert!(NavStep::crossing(2.0).crossed);
        assert!(!NavStep::partial(0.5).crossed);
        assert!(NavStep::miss().is_miss());
        assert!(!NavStep::crossing(3.0).is_miss());
    }
}
