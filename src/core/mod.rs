//! Core layer - ray marching, accumulation, and weighted sampling.
//!
//! This module provides:
//! - [`Ray`] / [`March`] - boundary-to-boundary traversal of a geometry
//! - [`PathLengthList`] - per-isotope accumulated path lengths
//! - [`GeomEngine`] / [`EngineConfig`] - the traversal engine over a backend
//! - [`GeomAnalyzer`] - the object-safe query surface drivers consume
//! - [`VertexSample`] - outcome of a weighted vertex draw
//! - [`MaxPathTable`] - persisted maximum path lengths
//! - [`PointAnalyzer`] - geometry-less fixed target mix

mod engine;
mod estimator;
mod marcher;
mod max_paths;
mod paths;
mod point;
mod traits;
mod vertex;

pub use engine::{EngineConfig, GeomEngine, MixturePolicy};
pub use marcher::{CapBehavior, March, Ray, Segment, DEFAULT_CROSSING_CAP};
pub use max_paths::MaxPathTable;
pub use paths::PathLengthList;
pub use point::PointAnalyzer;
pub use traits::GeomAnalyzer;
pub use vertex::VertexSample;
