//! Isotope identifiers and the registered-isotope set.

use std::fmt;

/// Identifier of a nuclide, backed by its PDG 10LZZZAAAI ion code.
///
/// Derived deterministically from (mass number, atomic number), so it is
/// stable across runs and directly comparable with particle codes from
/// external tools.
///
/// # Example
///
/// ```
/// use nugeom::material::IsotopeId;
///
/// let o16 = IsotopeId::new(16, 8);
/// assert_eq!(o16.code(), 1000080160);
/// assert_eq!(o16.a(), 16);
/// assert_eq!(o16.z(), 8);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsotopeId(i32);

impl IsotopeId {
    /// Identifier for the nuclide with mass number `a` and atomic number `z`.
    #[inline]
    pub const fn new(a: u32, z: u32) -> Self {
        Self(pdg::ion_code(a, z))
    }

    /// Wrap a raw particle code, if it lies in the nuclear block.
    pub fn from_code(code: i32) -> Option<Self> {
        if pdg::is_ion(code) {
            Some(Self(code))
        } else {
            None
        }
    }

    /// The underlying PDG ion code.
    #[inline]
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Mass number A.
    #[inline]
    pub const fn a(&self) -> u32 {
        pdg::ion_a(self.0)
    }

    /// Atomic number Z.
    #[inline]
    pub const fn z(&self) -> u32 {
        pdg::ion_z(self.0)
    }

    /// True for bound nuclei (A > 1), false for free nucleons.
    #[inline]
    pub fn is_nucleus(&self) -> bool {
        self.a() > 1
    }
}

impl fmt::Display for IsotopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", pdg::name(self.0))
    }
}

impl fmt::Debug for IsotopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IsotopeId({})", pdg::name(self.0))
    }
}

/// The set of all isotopes occurring anywhere in a geometry.
///
/// Built once by walking every volume's material at load time; immutable
/// afterwards. Every id a path-length list is keyed by is a member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsotopeSet {
    ids: Vec<IsotopeId>,
}

impl IsotopeSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id, keeping the set sorted and duplicate-free.
    pub fn insert(&mut self, id: IsotopeId) {
        if let Err(pos) = self.ids.binary_search(&id) {
            self.ids.insert(pos, id);
        }
    }

    /// Membership test.
    #[inline]
    pub fn contains(&self, id: IsotopeId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Number of distinct isotopes.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if no isotope is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate ids in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = IsotopeId> + '_ {
        self.ids.iter().copied()
    }

    /// Ids as a sorted slice.
    pub fn as_slice(&self) -> &[IsotopeId] {
        &self.ids
    }
}

impl FromIterator<IsotopeId> for IsotopeSet {
    fn from_iter<T: IntoIterator<Item = IsotopeId>>(iter: T) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotope_id() {
        let o16 = IsotopeId::new(16, 8);
        assert_eq!(o16.code(), 1000080160);
        assert_eq!(o16.a(), 16);
        assert_eq!(o16.z(), 8);
        assert!(o16.is_nucleus());
        assert_eq!(format!("{}", o16), "O16");

        let h1 = IsotopeId::new(1, 1);
        assert!(!h1.is_nucleus());

        assert!(IsotopeId::from_code(1000080160).is_some());
        assert!(IsotopeId::from_code(2212).is_none());
    }

    #[test]
    fn test_isotope_set() {
        let mut set = IsotopeSet::new();
        set.insert(IsotopeId::new(56, 26));
        set.insert(IsotopeId::new(16, 8));
        set.insert(IsotopeId::new(16, 8)); // duplicate

        assert_eq!(set.len(), 2);
        assert!(set.contains(IsotopeId::new(16, 8)));
        assert!(!set.contains(IsotopeId::new(1, 1)));

        // sorted ascending by code
        let codes: Vec<i32> = set.iter().map(|id| id.code()).collect();
        assert_eq!(codes, vec![1000080160, 1000260560]);
    }

    #[test]
    fn test_from_iterator() {
        let set: IsotopeSet = [IsotopeId::new(12, 6), IsotopeId::new(1, 1)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }
}
