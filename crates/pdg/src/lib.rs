//! PDG Monte Carlo particle numbering helpers.
//!
//! Follows the PDG 2006 numbering scheme. Nuclear codes use the
//! 10LZZZAAAI convention: `1000000000 + Z*10000 + A*10` for a ground-state
//! nucleus with atomic number Z and mass number A (L = strangeness digits
//! and I = isomer level are zero for everything handled here).

/// Base offset of the 10LZZZAAAI nuclear code block.
pub const ION_BASE: i32 = 1_000_000_000;

// Leptons
pub const ELECTRON: i32 = 11;
pub const NU_E: i32 = 12;
pub const MUON: i32 = 13;
pub const NU_MU: i32 = 14;
pub const TAU: i32 = 15;
pub const NU_TAU: i32 = 16;

// Nucleons
pub const PROTON: i32 = 2212;
pub const NEUTRON: i32 = 2112;

/// Build the ground-state ion code for a nucleus with mass number `a`
/// and atomic number `z`.
///
/// # Example
///
/// ```
/// assert_eq!(pdg::ion_code(16, 8), 1000080160); // O16
/// assert_eq!(pdg::ion_code(1, 1), 1000010010);  // free proton as a nucleus
/// ```
#[inline]
pub const fn ion_code(a: u32, z: u32) -> i32 {
    ION_BASE + (z as i32) * 10_000 + (a as i32) * 10
}

/// Mass number A encoded in an ion code.
#[inline]
pub const fn ion_a(code: i32) -> u32 {
    ((code / 10) % 1000) as u32
}

/// Atomic number Z encoded in an ion code.
#[inline]
pub const fn ion_z(code: i32) -> u32 {
    ((code / 10_000) % 1000) as u32
}

/// True if `code` lies in the nuclear code block.
#[inline]
pub const fn is_ion(code: i32) -> bool {
    code >= ION_BASE && code < 2_000_000_000
}

/// True for any of the six neutrino codes.
#[inline]
pub const fn is_neutrino(code: i32) -> bool {
    matches!(code.abs(), NU_E | NU_MU | NU_TAU)
}

/// True for a proton or neutron code.
#[inline]
pub const fn is_nucleon(code: i32) -> bool {
    code == PROTON || code == NEUTRON
}

/// Chemical symbols indexed by atomic number (index 0 unused).
const SYMBOLS: [&str; 105] = [
    "?", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg",
    "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr",
    "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr",
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf",
    "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po",
    "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf",
];

/// Chemical symbol for atomic number `z`, if known.
pub fn element_symbol(z: u32) -> Option<&'static str> {
    if z == 0 || z as usize >= SYMBOLS.len() {
        None
    } else {
        Some(SYMBOLS[z as usize])
    }
}

/// Human-readable name for a particle code ("O16", "nu_mu", "2212", ...).
pub fn name(code: i32) -> String {
    match code {
        ELECTRON => "e-".to_string(),
        c if c == -ELECTRON => "e+".to_string(),
        NU_E => "nu_e".to_string(),
        c if c == -NU_E => "nu_e_bar".to_string(),
        MUON => "mu-".to_string(),
        c if c == -MUON => "mu+".to_string(),
        NU_MU => "nu_mu".to_string(),
        c if c == -NU_MU => "nu_mu_bar".to_string(),
        TAU => "tau-".to_string(),
        c if c == -TAU => "tau+".to_string(),
        NU_TAU => "nu_tau".to_string(),
        c if c == -NU_TAU => "nu_tau_bar".to_string(),
        PROTON => "proton".to_string(),
        NEUTRON => "neutron".to_string(),
        c if is_ion(c) => match element_symbol(ion_z(c)) {
            Some(sym) => format!("{}{}", sym, ion_a(c)),
            None => format!("ion({},{})", ion_a(c), ion_z(c)),
        },
        c => format!("{}", c),
    }
}
