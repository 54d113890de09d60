use serde::{Deserialize, Serialize};

/// How the positions of a puzzle are arranged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Geometry {
    /// A row of positions with two ends (houses on a street).
    #[default]
    Linear,
    /// A ring of positions (seats around a table). The last position is
    /// followed by the first one.
    Circular,
}

impl Geometry {
    /// The position immediately after `position`, if any.
    pub fn next(&self, position: usize, n_positions: usize) -> Option<usize> {
        match self {
            Geometry::Linear => (position + 1 < n_positions).then_some(position + 1),
            Geometry::Circular => Some((position + 1) % n_positions),
        }
    }

    /// Opposite seats only exist around a table with an even number of seats.
    pub fn supports_opposite(&self, n_positions: usize) -> bool {
        *self == Geometry::Circular && n_positions >= 2 && n_positions % 2 == 0
    }

    pub fn opposite(&self, position: usize, n_positions: usize) -> Option<usize> {
        self.supports_opposite(n_positions)
            .then(|| (position + n_positions / 2) % n_positions)
    }

    pub fn has_edges(&self) -> bool {
        *self == Geometry::Linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_linear_stops_at_end() {
        assert_eq!(Geometry::Linear.next(0, 4), Some(1));
        assert_eq!(Geometry::Linear.next(3, 4), None);
    }

    #[test]
    fn test_next_circular_wraps() {
        assert_eq!(Geometry::Circular.next(3, 4), Some(0));
        assert_eq!(Geometry::Circular.next(1, 4), Some(2));
    }

    #[test]
    fn test_opposite_requires_even_circle() {
        assert_eq!(Geometry::Circular.opposite(1, 6), Some(4));
        assert_eq!(Geometry::Circular.opposite(4, 6), Some(1));
        assert_eq!(Geometry::Circular.opposite(1, 5), None);
        assert_eq!(Geometry::Linear.opposite(1, 6), None);
    }
}
