//! Reference geometry backend: a tree of nested axis-aligned boxes.
//!
//! Each volume is an axis-aligned box with one material; children lie
//! strictly inside their parent and the innermost volume wins point
//! lookups. Boundary distances use the slab method over every box in the
//! active subtree - volume counts in detector descriptions are small
//! enough that a linear scan beats any index.
//!
//! Geometries load from a JSON document:
//!
//! ```json
//! {
//!   "units": { "length": "mm", "density": "g_cm3" },
//!   "materials": [
//!     { "name": "Water", "density": 1.0, "composition": [
//!       { "a": 1,  "z": 1, "fraction": 0.112 },
//!       { "a": 16, "z": 8, "fraction": 0.888 } ] },
//!     { "name": "Iron", "density": 7.87, "a": 56, "z": 26 }
//!   ],
//!   "volumes": [
//!     { "name": "World",  "material": "Water", "center": [0,0,0], "half": [5000,5000,5000] },
//!     { "name": "Magnet", "material": "Iron",  "center": [0,0,1000], "half": [400,400,200],
//!       "parent": "World" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde_json::Value;

use crate::geom::{NavStep, VolumeNavigator};
use crate::material::{IsotopeId, Material, MaterialHandle, MaterialTable};
use crate::util::{units, BBox3d, DVec3, Error, Result};

/// One node of the box tree.
#[derive(Clone, Debug)]
struct BoxVolume {
    name: String,
    bounds: BBox3d,
    material: MaterialHandle,
    children: Vec<usize>,
}

/// Nested axis-aligned box geometry.
#[derive(Clone, Debug, Default)]
pub struct BoxTree {
    volumes: Vec<BoxVolume>,
    materials: MaterialTable,
    /// Root of the subtree navigation is restricted to (the "top volume").
    top: usize,
}

impl BoxTree {
    /// Empty geometry; add materials and volumes before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material for later volume assignments.
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.add(material)
    }

    /// Add a volume. The first volume added becomes the world and must
    /// have no parent; every later volume names a parent it fits inside.
    pub fn add_volume(
        &mut self,
        name: impl Into<String>,
        bounds: BBox3d,
        material: MaterialHandle,
        parent: Option<&str>,
    ) -> Result<()> {
        let name = name.into();
        if bounds.is_empty() {
            return Err(Error::InvalidGeometry(format!(
                "volume '{}' has an empty bounding box",
                name
            )));
        }
        if self.materials.get(material).is_none() {
            return Err(Error::InvalidGeometry(format!(
                "volume '{}' references an unknown material",
                name
            )));
        }
        if self.volumes.iter().any(|v| v.name == name) {
            return Err(Error::InvalidGeometry(format!(
                "duplicate volume name '{}'",
                name
            )));
        }

        let index = self.volumes.len();
        match (parent, index) {
            (None, 0) => {}
            (None, _) => {
                return Err(Error::InvalidGeometry(format!(
                    "volume '{}' has no parent but the world already exists",
                    name
                )))
            }
            (Some(_), 0) => {
                return Err(Error::InvalidGeometry(format!(
                    "first volume '{}' must be the world (no parent)",
                    name
                )))
            }
            (Some(parent_name), _) => {
                let Some(pidx) = self.volume_index(parent_name) else {
                    return Err(Error::InvalidGeometry(format!(
                        "volume '{}' names unknown parent '{}'",
                        name, parent_name
                    )));
                };
                if !self.volumes[pidx].bounds.contains_box(&bounds) {
                    return Err(Error::InvalidGeometry(format!(
                        "volume '{}' is not contained in parent '{}'",
                        name, parent_name
                    )));
                }
                self.volumes[pidx].children.push(index);
            }
        }

        self.volumes.push(BoxVolume {
            name,
            bounds,
            material,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Restrict navigation to the subtree rooted at the named volume.
    pub fn set_top(&mut self, name: &str) -> Result<()> {
        match self.volume_index(name) {
            Some(idx) => {
                self.top = idx;
                Ok(())
            }
            None => Err(Error::InvalidGeometry(format!(
                "top volume '{}' does not exist",
                name
            ))),
        }
    }

    /// Name of the current top volume.
    pub fn top_volume(&self) -> Option<&str> {
        self.volumes.get(self.top).map(|v| v.name.as_str())
    }

    /// Number of volumes in the tree.
    pub fn num_volumes(&self) -> usize {
        self.volumes.len()
    }

    fn volume_index(&self, name: &str) -> Option<usize> {
        self.volumes.iter().position(|v| v.name == name)
    }

    /// Indices of every volume in the active (top) subtree.
    fn active_volumes(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.volumes.len());
        let mut stack = vec![self.top];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.volumes[idx].children.iter().copied());
        }
        out
    }

    // ========================================================================
    // JSON loading
    // ========================================================================

    /// Load a geometry from a JSON file, converting declared units to the
    /// engine's canonical meters and kg/m3.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_file_with_units(
            path,
            units::DEFAULT_LENGTH_UNIT,
            units::DEFAULT_DENSITY_UNIT,
        )
    }

    /// Like [`from_json_file`], with caller-supplied unit names used when
    /// the file declares none.
    ///
    /// [`from_json_file`]: BoxTree::from_json_file
    pub fn from_json_file_with_units(
        path: impl AsRef<Path>,
        length_unit: &str,
        density_unit: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let tree = Self::from_json_str_with_units(&text, length_unit, density_unit)?;
        tracing::info!(
            volumes = tree.num_volumes(),
            materials = tree.materials.len(),
            "loaded geometry from {}",
            path.display()
        );
        Ok(tree)
    }

    /// Parse a geometry from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_json_str_with_units(
            text,
            units::DEFAULT_LENGTH_UNIT,
            units::DEFAULT_DENSITY_UNIT,
        )
    }

    /// Parse a geometry from JSON text; `length_unit` and `density_unit`
    /// apply where the file's `units` section is silent.
    pub fn from_json_str_with_units(
        text: &str,
        length_unit: &str,
        density_unit: &str,
    ) -> Result<Self> {
        let doc: Value = serde_json::from_str(text)?;

        let lscale = units::length_scale(
            doc.pointer("/units/length")
                .and_then(Value::as_str)
                .unwrap_or(length_unit),
        )?;
        let dscale = units::density_scale(
            doc.pointer("/units/density")
                .and_then(Value::as_str)
                .unwrap_or(density_unit),
        )?;

        let mut tree = Self::new();

        let materials = doc
            .get("materials")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::invalid("geometry has no 'materials' array"))?;
        for entry in materials {
            tree.add_material(parse_material(entry, dscale)?);
        }

        let volumes = doc
            .get("volumes")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::invalid("geometry has no 'volumes' array"))?;
        if volumes.is_empty() {
            return Err(Error::invalid("geometry declares no volumes"));
        }
        for entry in volumes {
            let name = str_field(entry, "name")?;
            let material_name = str_field(entry, "material")?;
            let material = tree.materials.find(material_name).ok_or_else(|| {
                Error::InvalidGeometry(format!(
                    "volume '{}' references undeclared material '{}'",
                    name, material_name
                ))
            })?;
            let center = vec3_field(entry, "center")? * lscale;
            let half = vec3_field(entry, "half")? * lscale;
            let parent = entry.get("parent").and_then(Value::as_str);
            tree.add_volume(
                name,
                BBox3d::from_center_half(center, half),
                material,
                parent,
            )?;
        }

        Ok(tree)
    }
}

fn str_field<'a>(entry: &'a Value, key: &str) -> Result<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid(format!("missing string field '{}'", key)))
}

fn f64_field(entry: &Value, key: &str) -> Result<f64> {
    entry
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::invalid(format!("missing numeric field '{}'", key)))
}

fn u32_field(entry: &Value, key: &str) -> Result<u32> {
    entry
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .ok_or_else(|| Error::invalid(format!("missing integer field '{}'", key)))
}

fn vec3_field(entry: &Value, key: &str) -> Result<DVec3> {
    let arr = entry
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid(format!("missing vector field '{}'", key)))?;
    if arr.len() != 3 {
        return Err(Error::invalid(format!("field '{}' must have 3 components", key)));
    }
    let mut out = [0.0; 3];
    for (i, v) in arr.iter().enumerate() {
        out[i] = v
            .as_f64()
            .ok_or_else(|| Error::invalid(format!("field '{}' holds a non-number", key)))?;
    }
    Ok(DVec3::from_array(out))
}

fn parse_material(entry: &Value, dscale: f64) -> Result<Material> {
    let name = str_field(entry, "name")?;
    let density = f64_field(entry, "density")? * dscale;
    if density <= 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "material '{}' has non-positive density",
            name
        )));
    }

    if let Some(parts) = entry.get("composition").and_then(Value::as_array) {
        if parts.is_empty() {
            return Err(Error::InvalidGeometry(format!(
                "material '{}' has an empty composition",
                name
            )));
        }
        let mut composition = Vec::with_capacity(parts.len());
        for part in parts {
            let a = u32_field(part, "a")?;
            let z = u32_field(part, "z")?;
            let fraction = f64_field(part, "fraction")?;
            composition.push((IsotopeId::new(a, z), fraction));
        }
        Ok(Material::mixture(name, density, composition))
    } else {
        let a = u32_field(entry, "a")?;
        let z = u32_field(entry, "z")?;
        Ok(Material::single(name, a, z, density))
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Distances below this are treated as "already on the boundary" and
/// skipped when searching for the next crossing.
const SURFACE_EPS: f64 = 1e-12;

impl VolumeNavigator for BoxTree {
    fn locate(&self, point: DVec3) -> Option<MaterialHandle> {
        let top = self.volumes.get(self.top)?;
        if !top.bounds.contains(point) {
            return None;
        }
        // descend to the innermost containing volume
        let mut current = self.top;
        'descend: loop {
            for &child in &self.volumes[current].children {
                if self.volumes[child].bounds.contains(point) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(self.volumes[current].material);
        }
    }

    fn boundary_step(&self, point: DVec3, dir: DVec3) -> NavStep {
        let mut nearest = f64::INFINITY;
        for idx in self.active_volumes() {
            let Some((t_entry, t_exit)) = self.volumes[idx].bounds.ray_range(point, dir) else {
                continue;
            };
            if t_entry > SURFACE_EPS && t_entry < nearest {
                nearest = t_entry;
            }
            if t_exit > SURFACE_EPS && t_exit < nearest {
                nearest = t_exit;
            }
        }
        if nearest.is_finite() {
            NavStep::crossing(nearest)
        } else {
            NavStep::miss()
        }
    }

    fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    fn bounding_box(&self) -> BBox3d {
        self.volumes
            .get(self.top)
            .map(|v| v.bounds)
            .unwrap_or(BBox3d::EMPTY)
    }
}
