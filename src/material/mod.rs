//! Materials module - isotopes, compositions and the material table.
//!
//! This module provides the composition side of the geometry model:
//!
//! - **IsotopeId**: nuclide key derived from (A, Z), PDG ion-code backed
//! - **IsotopeSet**: all isotopes registered in a geometry, fixed at load
//! - **Material**: overall density plus (isotope, mass fraction) pairs
//! - **MaterialTable**: the distinct materials of one geometry
//!
//! ## Example
//!
//! ```ignore
//! use nugeom::material::{IsotopeId, Material, MaterialTable};
//!
//! let mut table = MaterialTable::new();
//! let water = table.add(Material::mixture("Water", 1.0, [
//!     (IsotopeId::new(1, 1), 0.112),
//!     (IsotopeId::new(16, 8), 0.888),
//! ]));
//! println!("{} isotopes registered", table.isotopes().len());
//! ```

mod isotope;
mod table;

pub use isotope::{IsotopeId, IsotopeSet};
pub use table::{Material, MaterialHandle, MaterialTable};
