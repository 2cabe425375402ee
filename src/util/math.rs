//! Math type re-exports and geometry math utilities.
//!
//! Re-exports the `glam` types used throughout the crate and provides the
//! axis-aligned bounding box the estimator samples from.

// Re-export glam types
pub use glam::{DVec2, DVec3, Vec3};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// 3D axis-aligned bounding box with double precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3d {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from its center and per-axis half-extents.
    #[inline]
    pub fn from_center_half(center: DVec3, half: DVec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Get the per-axis half-extents.
    #[inline]
    pub fn half_size(&self) -> DVec3 {
        (self.max - self.min) * 0.5
    }

    /// Closed-interval point containment test.
    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// True if `other` lies entirely inside this box.
    #[inline]
    pub fn contains_box(&self, other: &Self) -> bool {
        !other.is_empty() && self.contains(other.min) && self.contains(other.max)
    }

    /// Entry and exit distances of a ray against this box (slab method),
    /// or None if the ray misses. Distances may be negative when the
    /// origin lies past a face. Safe for axis-parallel rays: the slab of
    /// a zero direction component yields +/-inf, never NaN poisoning,
    /// because f64 min/max ignore the NaN operand.
    pub fn ray_range(&self, origin: DVec3, dir: DVec3) -> Option<(f64, f64)> {
        let o = origin.to_array();
        let d = dir.to_array();
        let lo = self.min.to_array();
        let hi = self.max.to_array();

        let mut t_entry = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / d[axis];
            let t1 = (lo[axis] - o[axis]) * inv;
            let t2 = (hi[axis] - o[axis]) * inv;
            t_entry = t_entry.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }
        (t_entry <= t_exit).then_some((t_entry, t_exit))
    }
}

impl Default for BBox3d {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3d({:?} - {:?})", self.min, self.max)
    }
}
