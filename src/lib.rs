//! # nugeom
//!
//! Geometry traversal and event-vertex generation for neutrino Monte-Carlo.
//!
//! The crate answers the three questions a neutrino event generator asks of
//! a detector description: how much of each isotope does a flux ray cross
//! (density-weighted path lengths), what is the most it could ever cross
//! (maximum path lengths, for a global probability scale), and where along
//! a chosen ray does an interaction on a chosen isotope happen (vertex
//! sampling). A small driver layer turns those answers plus a flux into an
//! event stream.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math types, unit scale factors
//! - [`material`] - Isotopes, materials, the material table
//! - [`geom`] - Volume navigation and the box-tree geometry
//! - [`core`] - Path lengths, ray marching, the analyzer engine
//! - [`flux`] - Flux drivers (mono-energetic, cylindrical histogram)
//! - [`event`] - Event records and the Pauli blocker
//! - [`driver`] - The Monte-Carlo job loop
//!
//! ## Example
//!
//! ```ignore
//! use nugeom::prelude::*;
//!
//! let tree = BoxTree::from_json_file("detector.json")?;
//! let engine = GeomEngine::new(tree);
//!
//! let ray = Ray::new(DVec3::new(0.0, 0.0, -2000.0), DVec3::Z)?;
//! for (isotope, length) in engine.path_lengths(ray)?.iter() {
//!     println!("{isotope}: {length:.3}");
//! }
//! ```

pub mod util;
pub mod material;
pub mod geom;
pub mod core;
pub mod flux;
pub mod event;
pub mod driver;

// Re-export commonly used types
pub use util::{Error, Result};
pub use core::{GeomAnalyzer, GeomEngine, PathLengthList};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BBox3d, DVec3, Error, Result};
    pub use crate::material::{IsotopeId, IsotopeSet, Material};
    pub use crate::geom::{BoxTree, VolumeNavigator};
    pub use crate::core::{
        EngineConfig, GeomAnalyzer, GeomEngine, MaxPathTable, MixturePolicy, PathLengthList,
        PointAnalyzer, Ray, VertexSample,
    };
    pub use crate::flux::{FluxDriver, FluxNeutrino, FluxSpec};
    pub use crate::event::{EventRecord, EventStatus};
    pub use crate::driver::McJob;
}
