use std::fmt;

use super::solution::MAX_GRID_SIZE;

/// A set of zero-based positions, stored as a bitmask.
///
/// Used as the domain of an item variable in the solvers: bit `p` is set when
/// the item may still occupy position `p`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PositionSet(u16);

const _: () = assert!(MAX_GRID_SIZE <= u16::BITS as usize);

impl PositionSet {
    pub const EMPTY: PositionSet = PositionSet(0);

    /// All positions `0..n_positions`.
    pub fn full(n_positions: usize) -> Self {
        debug_assert!(n_positions <= MAX_GRID_SIZE);
        if n_positions == 0 {
            return Self::EMPTY;
        }
        PositionSet((((1u32 << n_positions) - 1) & 0xFFFF) as u16)
    }

    pub fn single(position: usize) -> Self {
        PositionSet(1 << position)
    }

    pub fn contains(&self, position: usize) -> bool {
        position < MAX_GRID_SIZE && self.0 & (1 << position) != 0
    }

    pub fn insert(&mut self, position: usize) {
        self.0 |= 1 << position;
    }

    /// Returns true if the position was present.
    pub fn remove(&mut self, position: usize) -> bool {
        let present = self.contains(position);
        self.0 &= !(1 << position);
        present
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The only position in the set, if it has exactly one.
    pub fn single_value(&self) -> Option<usize> {
        if self.len() == 1 {
            Some(self.0.trailing_zeros() as usize)
        } else {
            None
        }
    }

    pub fn intersection(&self, other: PositionSet) -> PositionSet {
        PositionSet(self.0 & other.0)
    }

    pub fn union(&self, other: PositionSet) -> PositionSet {
        PositionSet(self.0 | other.0)
    }

    pub fn difference(&self, other: PositionSet) -> PositionSet {
        PositionSet(self.0 & !other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let bits = self.0;
        (0..MAX_GRID_SIZE).filter(move |p| bits & (1 << p) != 0)
    }
}

impl FromIterator<usize> for PositionSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = PositionSet::EMPTY;
        for position in iter {
            set.insert(position);
        }
        set
    }
}

impl fmt::Debug for PositionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_remove() {
        let mut set = PositionSet::full(4);
        assert_eq!(set.len(), 4);
        assert!(set.contains(3));
        assert!(!set.contains(4));

        assert!(set.remove(2));
        assert!(!set.remove(2));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 3]);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(PositionSet::single(5).single_value(), Some(5));
        assert_eq!(PositionSet::full(2).single_value(), None);
        assert_eq!(PositionSet::EMPTY.single_value(), None);
        assert_eq!(PositionSet::full(MAX_GRID_SIZE).len(), MAX_GRID_SIZE);
    }

    #[test]
    fn test_set_operations() {
        let a: PositionSet = [0, 1, 2].into_iter().collect();
        let b: PositionSet = [1, 2, 3].into_iter().collect();
        assert_eq!(a.intersection(b), [1, 2].into_iter().collect());
        assert_eq!(a.union(b), PositionSet::full(4));
        assert_eq!(a.difference(b), PositionSet::single(0));
    }
}
