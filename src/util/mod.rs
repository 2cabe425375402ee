//! Utility types and functions for nugeom.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus [`BBox3d`]
//! - Geometry unit scale factors
pub mod units;

mod error;
mod math;

pub use error::*;
pub use math::*;
