//! Pauli blocking of recoil nucleons.
//!
//! A quasi-elastic recoil nucleon whose momentum falls below the Fermi sea
//! level of its nucleus cannot exist: such events are blocked and must be
//! regenerated. Fermi momenta come from a per-nucleus table (proton and
//! neutron columns) fitted to electron scattering data; lookups match the
//! nucleus with the closest mass number, so every isotope resolves to
//! something sensible.

use crate::material::IsotopeId;
use crate::util::{Error, Result};

/// One table row: mass number and Fermi momenta in GeV.
#[derive(Clone, Copy, Debug)]
struct KfRow {
    a: u32,
    proton: f64,
    neutron: f64,
}

/// Fermi momenta from the Moniz electron-scattering fits, in GeV.
const MONIZ_ROWS: &[KfRow] = &[
    KfRow { a: 6, proton: 0.169, neutron: 0.169 },
    KfRow { a: 12, proton: 0.221, neutron: 0.221 },
    KfRow { a: 16, proton: 0.225, neutron: 0.225 },
    KfRow { a: 24, proton: 0.235, neutron: 0.235 },
    KfRow { a: 40, proton: 0.251, neutron: 0.251 },
    KfRow { a: 59, proton: 0.257, neutron: 0.257 },
    KfRow { a: 119, proton: 0.260, neutron: 0.260 },
    KfRow { a: 181, proton: 0.265, neutron: 0.265 },
    KfRow { a: 208, proton: 0.265, neutron: 0.265 },
];

/// Per-nucleus Fermi momenta with closest-mass-number lookup.
#[derive(Clone, Debug)]
pub struct FermiMomentumTable {
    rows: Vec<KfRow>,
}

impl FermiMomentumTable {
    /// The default table (Moniz fits).
    pub fn new() -> Self {
        Self {
            rows: MONIZ_ROWS.to_vec(),
        }
    }

    /// Fermi momentum for a `nucleon` (proton or neutron PDG code) bound
    /// in `target`, taken from the row with the closest mass number.
    pub fn kf(&self, target: IsotopeId, nucleon: i32) -> Result<f64> {
        let row = self
            .rows
            .iter()
            .min_by_key(|row| row.a.abs_diff(target.a()))
            .ok_or_else(|| Error::invalid("empty Fermi momentum table"))?;
        match nucleon {
            pdg::PROTON => Ok(row.proton),
            pdg::NEUTRON => Ok(row.neutron),
            other => Err(Error::invalid(format!(
                "{} is not a nucleon code",
                other
            ))),
        }
    }
}

impl Default for FermiMomentumTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the Pauli exclusion check to candidate events.
#[derive(Clone, Debug, Default)]
pub struct PauliBlocker {
    table: FermiMomentumTable,
}

impl PauliBlocker {
    /// Blocker over the default Fermi momentum table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocker over a caller-supplied table.
    pub fn with_table(table: FermiMomentumTable) -> Self {
        Self { table }
    }

    /// True if a recoil `nucleon` of momentum `p` (GeV) is blocked inside
    /// `target`. Free nucleons are never blocked.
    pub fn is_blocked(&self, target: IsotopeId, nucleon: i32, p: f64) -> Result<bool> {
        if !target.is_nucleus() {
            return Ok(false);
        }
        let kf = self.table.kf(target, nucleon)?;
        Ok(p < kf)
    }
}
