//! Event records and event-level physics checks.
//!
//! This module provides:
//! - [`EventRecord`] - one generated interaction, serializable as JSON
//! - [`EventStatus`] - accepted or Pauli-blocked
//! - [`PauliBlocker`] / [`FermiMomentumTable`] - recoil nucleon exclusion

use serde_json::{json, Value};

use crate::material::IsotopeId;
use crate::util::{DVec3, Error, Result};

mod pauli;

pub use pauli::{FermiMomentumTable, PauliBlocker};

/// Fate of a candidate event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    /// Fully generated interaction.
    Generated,
    /// Candidate whose recoil nucleon fell below the Fermi sea level.
    PauliBlocked,
}

impl EventStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::PauliBlocked => "pauli_blocked",
        }
    }

    /// Parse a wire name.
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "generated" => Ok(Self::Generated),
            "pauli_blocked" => Ok(Self::PauliBlocked),
            other => Err(Error::invalid(format!("unknown event status '{}'", other))),
        }
    }
}

/// One generated interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRecord {
    /// Run number the event belongs to.
    pub run: u32,
    /// Event index within the run.
    pub index: u64,
    /// Probe species (PDG code).
    pub probe: i32,
    /// Probe energy in GeV.
    pub energy: f64,
    /// Struck target isotope.
    pub target: IsotopeId,
    /// Interaction point.
    pub vertex: DVec3,
    /// Interaction weight of the accepted candidate.
    pub weight: f64,
    /// Outcome of the candidate.
    pub status: EventStatus,
}

impl EventRecord {
    /// The record as one JSON object (one line of the output stream).
    pub fn to_json(&self) -> Value {
        json!({
            "run": self.run,
            "event": self.index,
            "probe": self.probe,
            "energy": self.energy,
            "target": self.target.code(),
            "vertex": [self.vertex.x, self.vertex.y, self.vertex.z],
            "weight": self.weight,
            "status": self.status.as_str(),
        })
    }

    /// Parse a record back from its JSON object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let field = |key: &str| {
            value
                .get(key)
                .ok_or_else(|| Error::invalid(format!("event record misses '{}'", key)))
        };
        let target_code = field("target")?
            .as_i64()
            .ok_or_else(|| Error::invalid("non-numeric target code"))? as i32;
        let target =
            IsotopeId::from_code(target_code).ok_or(Error::UnknownIsotope(target_code))?;
        let vertex = field("vertex")?
            .as_array()
            .filter(|a| a.len() == 3)
            .map(|a| {
                let mut out = [0.0; 3];
                for (i, v) in a.iter().enumerate() {
                    out[i] = v.as_f64().unwrap_or(f64::NAN);
                }
                DVec3::from_array(out)
            })
            .ok_or_else(|| Error::invalid("event vertex must be a 3-array"))?;

        Ok(Self {
            run: field("run")?.as_u64().unwrap_or(0) as u32,
            index: field("event")?.as_u64().unwrap_or(0),
            probe: field("probe")?
                .as_i64()
                .ok_or_else(|| Error::invalid("non-numeric probe code"))? as i32,
            energy: field("energy")?
                .as_f64()
                .ok_or_else(|| Error::invalid("non-numeric probe energy"))?,
            target,
            vertex,
            weight: field("weight")?.as_f64().unwrap_or(1.0),
            status: EventStatus::from_str(
                field("status")?
                    .as_str()
                    .ok_or_else(|| Error::invalid("event status must be a string"))?,
            )?,
        })
    }
}
