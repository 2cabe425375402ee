//! Materials and the per-geometry material table.

use smallvec::SmallVec;

use crate::material::{IsotopeId, IsotopeSet};

/// A detector material: overall mass density plus an elemental composition.
///
/// A pure material has a single constituent with fraction 1; a mixture has
/// several (isotope, mass fraction) pairs. Fractions are not required to
/// sum to 1 - the traversal engine treats each constituent independently.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    name: String,
    density: f64,
    composition: SmallVec<[(IsotopeId, f64); 4]>,
}

impl Material {
    /// Pure single-isotope material.
    pub fn single(name: impl Into<String>, a: u32, z: u32, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
            composition: SmallVec::from_slice(&[(IsotopeId::new(a, z), 1.0)]),
        }
    }

    /// Mixture of several isotopes sharing one overall density.
    pub fn mixture(
        name: impl Into<String>,
        density: f64,
        parts: impl IntoIterator<Item = (IsotopeId, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            density,
            composition: parts.into_iter().collect(),
        }
    }

    /// Material name as declared in the geometry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overall mass density.
    #[inline]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// True if more than one constituent is present.
    #[inline]
    pub fn is_mixture(&self) -> bool {
        self.composition.len() > 1
    }

    /// Constituents as (isotope, mass fraction) pairs, in declaration order.
    #[inline]
    pub fn composition(&self) -> &[(IsotopeId, f64)] {
        &self.composition
    }

    /// Mass fraction of `id` in this material, if present.
    pub fn fraction_of(&self, id: IsotopeId) -> Option<f64> {
        self.composition
            .iter()
            .find(|(iso, _)| *iso == id)
            .map(|(_, f)| *f)
    }
}

/// Opaque handle to a material inside one [`MaterialTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MaterialHandle(pub(crate) u32);

/// All distinct materials of one geometry.
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its handle.
    pub fn add(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        self.materials.push(material);
        handle
    }

    /// Look up a material by handle.
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0 as usize)
    }

    /// Find a material handle by name.
    pub fn find(&self, name: &str) -> Option<MaterialHandle> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|i| MaterialHandle(i as u32))
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True if the table holds no materials.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterate (handle, material) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialHandle(i as u32), m))
    }

    /// Collect every isotope occurring in any material.
    pub fn isotopes(&self) -> IsotopeSet {
        self.materials
            .iter()
            .flat_map(|m| m.composition().iter().map(|(id, _)| *id))
            .collect()
    }
}
