//! Geometry unit handling.
//!
//! Geometry files declare the units their numbers are written in; the
//! loader converts everything to the engine's canonical pair (meters,
//! kg/m3) using the scale factors below. The engine itself is
//! unit-agnostic.

use crate::util::{Error, Result};

/// Default length unit assumed for geometry files.
pub const DEFAULT_LENGTH_UNIT: &str = "mm";

/// Default density unit assumed for geometry files.
pub const DEFAULT_DENSITY_UNIT: &str = "g_cm3";

/// Scale factor from a named length unit to meters.
pub fn length_scale(name: &str) -> Result<f64> {
    match name {
        "m" => Ok(1.0),
        "cm" => Ok(1.0e-2),
        "mm" => Ok(1.0e-3),
        "um" => Ok(1.0e-6),
        "km" => Ok(1.0e3),
        "fm" => Ok(1.0e-15),
        _ => Err(Error::UnknownUnit(name.to_string())),
    }
}

/// Scale factor from a named density unit to kg/m3.
pub fn density_scale(name: &str) -> Result<f64> {
    match name {
        "kg_m3" => Ok(1.0),
        "g_cm3" => Ok(1.0e3),
        "g_m3" => Ok(1.0e-3),
        _ => Err(Error::UnknownUnit(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_scale() {
        assert_eq!(length_scale("m").unwrap(), 1.0);
        assert_eq!(length_scale("mm").unwrap(), 1.0e-3);
        assert!(length_scale("furlong").is_err());
    }

    #[test]
    fn test_density_scale() {
        assert_eq!(density_scale("g_cm3").unwrap(), 1.0e3);
        assert_eq!(density_scale("kg_m3").unwrap(), 1.0);
        assert!(density_scale("slug_ft3").is_err());
    }

    #[test]
    fn test_defaults_resolve() {
        assert!(length_scale(DEFAULT_LENGTH_UNIT).is_ok());
        assert!(density_scale(DEFAULT_DENSITY_UNIT).is_ok());
    }
}
