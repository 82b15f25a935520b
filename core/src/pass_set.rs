//! Growable set of pass indices.
//!
//! [`PassSet`] is the dependency mask type of the frame graph. It is backed by
//! a [`FixedBitSet`] sized to the per-frame pass budget and grows on demand,
//! so graphs are not limited to the 64 passes a single machine word could
//! describe. Membership tests stay O(1) and iteration walks set bits in
//! ascending order.

use std::fmt;

use fixedbitset::FixedBitSet;

/// A set of pass indices.
#[derive(Clone, Default)]
pub struct PassSet {
    bits: FixedBitSet,
}

impl PassSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set pre-sized for `passes` indices.
    pub fn with_capacity(passes: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(passes),
        }
    }

    /// Create a set holding a single pass.
    pub fn single(pass: usize) -> Self {
        let mut set = Self::with_capacity(pass + 1);
        set.insert(pass);
        set
    }

    /// Add `pass`. Returns true if it was not already present.
    pub fn insert(&mut self, pass: usize) -> bool {
        if pass >= self.bits.len() {
            self.bits.grow(pass + 1);
        }
        !self.bits.put(pass)
    }

    /// Remove `pass`. Returns true if it was present.
    pub fn remove(&mut self, pass: usize) -> bool {
        if !self.contains(pass) {
            return false;
        }
        self.bits.set(pass, false);
        true
    }

    /// Returns true if `pass` is in the set.
    pub fn contains(&self, pass: usize) -> bool {
        self.bits.contains(pass)
    }

    /// Add every pass of `other`.
    pub fn union_with(&mut self, other: &PassSet) {
        self.bits.union_with(&other.bits);
    }

    /// Remove every pass of `other`.
    pub fn difference_with(&mut self, other: &PassSet) {
        self.bits.difference_with(&other.bits);
    }

    /// Returns true if every pass of `self` is also in `other`.
    pub fn is_subset(&self, other: &PassSet) -> bool {
        self.bits.is_subset(&other.bits)
    }

    /// Returns true if no pass is set.
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    /// Number of passes in the set.
    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Remove all passes, keeping the allocation.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Iterate over the set passes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }

    /// Smallest set pass that is `>= start`.
    pub fn first_from(&self, start: usize) -> Option<usize> {
        self.bits.ones().find(|&pass| pass >= start)
    }
}

impl PartialEq for PassSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for PassSet {}

impl FromIterator<usize> for PassSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::new();
        for pass in iter {
            set.insert(pass);
        }
        set
    }
}

impl Extend<usize> for PassSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for pass in iter {
            self.insert(pass);
        }
    }
}

impl fmt::Debug for PassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_grows_past_word_size() {
        let mut set = PassSet::with_capacity(8);
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(130));
        assert!(set.contains(130));
        assert!(!set.contains(129));
        assert!(!set.contains(10_000));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn test_iter_is_ascending() {
        let set: PassSet = [70, 2, 64, 0].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 2, 64, 70]);
    }

    #[test]
    fn test_union_and_difference() {
        let mut a: PassSet = [1, 2, 3].into_iter().collect();
        let b: PassSet = [3, 80].into_iter().collect();
        a.union_with(&b);
        assert_eq!(a, [1, 2, 3, 80].into_iter().collect());
        a.difference_with(&b);
        assert_eq!(a, [1, 2].into_iter().collect());
        assert!(a.is_subset(&[0, 1, 2].into_iter().collect()));
    }

    #[test]
    fn test_set_algebra_across_sizes() {
        let mut wide: PassSet = [2, 200].into_iter().collect();
        let narrow = PassSet::single(2);
        assert!(narrow.is_subset(&wide));
        assert!(!wide.is_subset(&narrow));
        assert!(PassSet::new().is_subset(&narrow));

        wide.difference_with(&narrow);
        assert_eq!(wide, PassSet::single(200));

        let mut short = PassSet::single(1);
        short.difference_with(&[1, 300].into_iter().collect());
        assert!(short.is_empty());
        assert_eq!(wide.first_from(3), Some(200));
        assert_eq!(wide.first_from(201), None);
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let small = PassSet::single(4);
        let mut large = PassSet::with_capacity(256);
        large.insert(4);
        assert_eq!(small, large);
    }

    #[test]
    fn test_first_from() {
        let set: PassSet = [5, 9].into_iter().collect();
        assert_eq!(set.first_from(0), Some(5));
        assert_eq!(set.first_from(6), Some(9));
        assert_eq!(set.first_from(10), None);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut set: PassSet = [1, 2].into_iter().collect();
        assert!(set.remove(1));
        assert!(!set.remove(1));
        assert!(!set.remove(500));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_debug_format() {
        let set: PassSet = [0, 3].into_iter().collect();
        assert_eq!(format!("{set:?}"), "{0, 3}");
    }
}
