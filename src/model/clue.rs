use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Item, PuzzleShape, Solution};

/// The kind of a clue, without its parameters. Used to key clue pools, recipes
/// and minimization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClueType {
    Positional,
    DirectLink,
    NegativeDirectLink,
    ConditionalLink,
    RelativePosition,
    OppositeLink,
    TransitiveSpatialLink,
    ThreeInARow,
    AtEdge,
    IsEven,
    DistanceGreaterThan,
    OrderedChain,
    SumEquals,
    EitherOr,
    IfAndOnlyIf,
    IfThen,
    NeitherNorPosition,
}

impl ClueType {
    pub fn all() -> Vec<ClueType> {
        vec![
            ClueType::Positional,
            ClueType::DirectLink,
            ClueType::NegativeDirectLink,
            ClueType::ConditionalLink,
            ClueType::RelativePosition,
            ClueType::OppositeLink,
            ClueType::TransitiveSpatialLink,
            ClueType::ThreeInARow,
            ClueType::AtEdge,
            ClueType::IsEven,
            ClueType::DistanceGreaterThan,
            ClueType::OrderedChain,
            ClueType::SumEquals,
            ClueType::EitherOr,
            ClueType::IfAndOnlyIf,
            ClueType::IfThen,
            ClueType::NeitherNorPosition,
        ]
    }

    /// How much a single clue of this type tends to narrow the search, 1 (weak)
    /// to 3 (strong). Minimization tries weak clues first.
    pub fn strength(&self) -> u8 {
        match self {
            ClueType::IfThen
            | ClueType::IfAndOnlyIf
            | ClueType::RelativePosition
            | ClueType::OrderedChain
            | ClueType::TransitiveSpatialLink
            | ClueType::OppositeLink => 3,
            ClueType::EitherOr
            | ClueType::SumEquals
            | ClueType::ThreeInARow
            | ClueType::DirectLink
            | ClueType::ConditionalLink => 2,
            ClueType::NegativeDirectLink
            | ClueType::NeitherNorPosition
            | ClueType::AtEdge
            | ClueType::IsEven
            | ClueType::DistanceGreaterThan
            | ClueType::Positional => 1,
        }
    }

    /// Plain pins and links, as opposed to everything that needs a second
    /// thought.
    pub fn is_simple(&self) -> bool {
        matches!(self, ClueType::Positional | ClueType::DirectLink)
    }
}

/// An atomic statement that compound clues are built from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fact {
    /// The item is at the given position.
    At { item: Item, position: usize },
    /// The two items share a position.
    Together(Item, Item),
}

impl Fact {
    pub fn items(&self) -> Vec<Item> {
        match *self {
            Fact::At { item, .. } => vec![item],
            Fact::Together(a, b) => vec![a, b],
        }
    }

    pub fn holds<F: Fn(Item) -> usize>(&self, position_of: &F) -> bool {
        match *self {
            Fact::At { item, position } => position_of(item) == position,
            Fact::Together(a, b) => position_of(a) == position_of(b),
        }
    }

    pub fn is_true_of(&self, solution: &Solution) -> bool {
        self.holds(&|item| solution.position_of(item))
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::At { item, position } => write!(f, "{}@{}", item, position + 1),
            Fact::Together(a, b) => write!(f, "{}={}", a, b),
        }
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A statement about the solution. Positions are zero-based.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Clue {
    /// The item is at `position`.
    Positional { position: usize, item: Item },
    /// Both items share a position.
    DirectLink(Item, Item),
    /// The items are at different positions.
    NegativeDirectLink(Item, Item),
    /// Same meaning as `DirectLink`, phrased as "whoever has A also has B".
    ConditionalLink(Item, Item),
    /// The second item is immediately after the first.
    RelativePosition(Item, Item),
    /// The items sit directly across the table from each other.
    OppositeLink(Item, Item),
    /// The three items occupy three consecutive positions, in this order.
    TransitiveSpatialLink(Item, Item, Item),
    /// The three items occupy three consecutive positions, in any order.
    ThreeInARow(Item, Item, Item),
    /// The item is at the first or last position.
    AtEdge(Item),
    /// The one-based position of the item is even (or odd when `even` is false).
    IsEven { item: Item, even: bool },
    DistanceGreaterThan { a: Item, b: Item, distance: usize },
    /// Strictly increasing positions, not necessarily adjacent.
    OrderedChain(Item, Item, Item),
    /// The one-based positions of the two items add up to `sum`.
    SumEquals { a: Item, b: Item, sum: usize },
    /// Exactly one of the facts holds.
    EitherOr(Fact, Fact),
    IfAndOnlyIf(Fact, Fact),
    IfThen(Fact, Fact),
    /// None of the items is at `position`.
    NeitherNorPosition { items: [Item; 2], position: usize },
}

impl Clue {
    pub fn clue_type(&self) -> ClueType {
        match self {
            Clue::Positional { .. } => ClueType::Positional,
            Clue::DirectLink(..) => ClueType::DirectLink,
            Clue::NegativeDirectLink(..) => ClueType::NegativeDirectLink,
            Clue::ConditionalLink(..) => ClueType::ConditionalLink,
            Clue::RelativePosition(..) => ClueType::RelativePosition,
            Clue::OppositeLink(..) => ClueType::OppositeLink,
            Clue::TransitiveSpatialLink(..) => ClueType::TransitiveSpatialLink,
            Clue::ThreeInARow(..) => ClueType::ThreeInARow,
            Clue::AtEdge(..) => ClueType::AtEdge,
            Clue::IsEven { .. } => ClueType::IsEven,
            Clue::DistanceGreaterThan { .. } => ClueType::DistanceGreaterThan,
            Clue::OrderedChain(..) => ClueType::OrderedChain,
            Clue::SumEquals { .. } => ClueType::SumEquals,
            Clue::EitherOr(..) => ClueType::EitherOr,
            Clue::IfAndOnlyIf(..) => ClueType::IfAndOnlyIf,
            Clue::IfThen(..) => ClueType::IfThen,
            Clue::NeitherNorPosition { .. } => ClueType::NeitherNorPosition,
        }
    }

    pub fn strength(&self) -> u8 {
        self.clue_type().strength()
    }

    /// Items the clue talks about, in argument order, without duplicates.
    pub fn items(&self) -> Vec<Item> {
        let mut items = match self {
            Clue::Positional { item, .. } | Clue::AtEdge(item) | Clue::IsEven { item, .. } => {
                vec![*item]
            }
            Clue::DirectLink(a, b)
            | Clue::NegativeDirectLink(a, b)
            | Clue::ConditionalLink(a, b)
            | Clue::RelativePosition(a, b)
            | Clue::OppositeLink(a, b)
            | Clue::DistanceGreaterThan { a, b, .. }
            | Clue::SumEquals { a, b, .. } => vec![*a, *b],
            Clue::TransitiveSpatialLink(a, b, c)
            | Clue::ThreeInARow(a, b, c)
            | Clue::OrderedChain(a, b, c) => vec![*a, *b, *c],
            Clue::EitherOr(f, g) | Clue::IfAndOnlyIf(f, g) | Clue::IfThen(f, g) => {
                let mut items = f.items();
                items.extend(g.items());
                items
            }
            Clue::NeitherNorPosition { items, .. } => items.to_vec(),
        };
        let mut seen = Vec::with_capacity(items.len());
        items.retain(|item| {
            if seen.contains(item) {
                false
            } else {
                seen.push(*item);
                true
            }
        });
        items
    }

    /// Absolute positions the clue mentions.
    pub fn positions(&self) -> Vec<usize> {
        let fact_position = |fact: &Fact| match fact {
            Fact::At { position, .. } => Some(*position),
            Fact::Together(..) => None,
        };
        match self {
            Clue::Positional { position, .. } | Clue::NeitherNorPosition { position, .. } => {
                vec![*position]
            }
            Clue::EitherOr(f, g) | Clue::IfAndOnlyIf(f, g) | Clue::IfThen(f, g) => {
                [f, g].into_iter().filter_map(fact_position).collect()
            }
            _ => vec![],
        }
    }

    /// Evaluates the clue for the positions reported by `position_of`.
    pub fn holds<F: Fn(Item) -> usize>(&self, shape: &PuzzleShape, position_of: &F) -> bool {
        let n = shape.n_positions;
        match self {
            Clue::Positional { position, item } => position_of(*item) == *position,
            Clue::DirectLink(a, b) | Clue::ConditionalLink(a, b) => {
                position_of(*a) == position_of(*b)
            }
            Clue::NegativeDirectLink(a, b) => position_of(*a) != position_of(*b),
            Clue::RelativePosition(a, b) => {
                shape.geometry.next(position_of(*a), n) == Some(position_of(*b))
            }
            Clue::OppositeLink(a, b) => {
                shape.geometry.opposite(position_of(*a), n) == Some(position_of(*b))
            }
            Clue::TransitiveSpatialLink(a, b, c) => {
                let (pa, pb, pc) = (position_of(*a), position_of(*b), position_of(*c));
                pb == pa + 1 && pc == pb + 1
            }
            Clue::ThreeInARow(a, b, c) => {
                let mut positions = [position_of(*a), position_of(*b), position_of(*c)];
                positions.sort_unstable();
                positions[1] == positions[0] + 1 && positions[2] == positions[1] + 1
            }
            Clue::AtEdge(item) => {
                let position = position_of(*item);
                position == 0 || position + 1 == n
            }
            Clue::IsEven { item, even } => ((position_of(*item) + 1) % 2 == 0) == *even,
            Clue::DistanceGreaterThan { a, b, distance } => {
                position_of(*a).abs_diff(position_of(*b)) > *distance
            }
            Clue::OrderedChain(a, b, c) => {
                let (pa, pb, pc) = (position_of(*a), position_of(*b), position_of(*c));
                pa < pb && pb < pc
            }
            Clue::SumEquals { a, b, sum } => position_of(*a) + position_of(*b) + 2 == *sum,
            Clue::EitherOr(f, g) => f.holds(position_of) != g.holds(position_of),
            Clue::IfAndOnlyIf(f, g) => f.holds(position_of) == g.holds(position_of),
            Clue::IfThen(f, g) => !f.holds(position_of) || g.holds(position_of),
            Clue::NeitherNorPosition { items, position } => {
                items.iter().all(|item| position_of(*item) != *position)
            }
        }
    }

    pub fn is_true_of(&self, solution: &Solution) -> bool {
        self.holds(&solution.shape, &|item| solution.position_of(item))
    }

    /// Whether this clue on its own says that `a` and `b` share a position.
    pub fn states_link(&self, a: Item, b: Item) -> bool {
        match *self {
            Clue::DirectLink(x, y) | Clue::ConditionalLink(x, y) => {
                (x == a && y == b) || (x == b && y == a)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clue::Positional { position, item } => write!(f, "{}@{}", item, position + 1),
            Clue::DirectLink(a, b) => write!(f, "{}={}", a, b),
            Clue::NegativeDirectLink(a, b) => write!(f, "{}!={}", a, b),
            Clue::ConditionalLink(a, b) => write!(f, "{}=>{}", a, b),
            Clue::RelativePosition(a, b) => write!(f, "{}>>{}", a, b),
            Clue::OppositeLink(a, b) => write!(f, "{}<>{}", a, b),
            Clue::TransitiveSpatialLink(a, b, c) => write!(f, "{}>>{}>>{}", a, b, c),
            Clue::ThreeInARow(a, b, c) => write!(f, "{{{},{},{}}}", a, b, c),
            Clue::AtEdge(item) => write!(f, "{}@edge", item),
            Clue::IsEven { item, even: true } => write!(f, "{}@even", item),
            Clue::IsEven { item, even: false } => write!(f, "{}@odd", item),
            Clue::DistanceGreaterThan { a, b, distance } => {
                write!(f, "|{}-{}|>{}", a, b, distance)
            }
            Clue::OrderedChain(a, b, c) => write!(f, "{}<{}<{}", a, b, c),
            Clue::SumEquals { a, b, sum } => write!(f, "{}+{}={}", a, b, sum),
            Clue::EitherOr(x, y) => write!(f, "({}) xor ({})", x, y),
            Clue::IfAndOnlyIf(x, y) => write!(f, "({}) <=> ({})", x, y),
            Clue::IfThen(x, y) => write!(f, "({}) => ({})", x, y),
            Clue::NeitherNorPosition { items, position } => {
                write!(f, "{},{}!@{}", items[0], items[1], position + 1)
            }
        }
    }
}

impl fmt::Debug for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geometry;

    fn item(s: &str) -> Item {
        Item::parse(s)
    }

    // Person = [A, B, C, D], Color = [Red, Blue, Green, Yellow] at positions 0..4,
    // so item index == position for both categories.
    fn identity_solution(n_categories: usize, n: usize, geometry: Geometry) -> Solution {
        Solution::from_grid(geometry, vec![(0..n).collect(); n_categories])
    }

    #[test]
    fn test_relative_position_needs_blue_second() {
        let solution = identity_solution(2, 4, Geometry::Linear);
        let clue = Clue::RelativePosition(item("0a"), item("1b"));
        assert!(clue.is_true_of(&solution));

        // Blue moved to position 3
        let moved = Solution::from_grid(Geometry::Linear, vec![vec![0, 1, 2, 3], vec![0, 2, 1, 3]]);
        assert!(!clue.is_true_of(&moved));
    }

    #[test]
    fn test_relative_position_wraps_only_when_circular() {
        let clue = Clue::RelativePosition(item("0d"), item("1a"));
        assert!(!clue.is_true_of(&identity_solution(2, 4, Geometry::Linear)));
        assert!(clue.is_true_of(&identity_solution(2, 4, Geometry::Circular)));
    }

    #[test]
    fn test_link_clues() {
        let solution = identity_solution(3, 4, Geometry::Linear);
        assert!(Clue::DirectLink(item("0b"), item("2b")).is_true_of(&solution));
        assert!(Clue::ConditionalLink(item("2c"), item("1c")).is_true_of(&solution));
        assert!(!Clue::DirectLink(item("0b"), item("2c")).is_true_of(&solution));
        assert!(Clue::NegativeDirectLink(item("0b"), item("2c")).is_true_of(&solution));
        assert!(!Clue::NegativeDirectLink(item("0b"), item("1b")).is_true_of(&solution));
    }

    #[test]
    fn test_opposite_is_symmetric() {
        let solution = identity_solution(2, 6, Geometry::Circular);
        assert!(Clue::OppositeLink(item("0a"), item("1d")).is_true_of(&solution));
        assert!(Clue::OppositeLink(item("1d"), item("0a")).is_true_of(&solution));
        assert!(!Clue::OppositeLink(item("0a"), item("1c")).is_true_of(&solution));
        assert!(!Clue::OppositeLink(item("0a"), item("1d"))
            .is_true_of(&identity_solution(2, 6, Geometry::Linear)));
    }

    #[test]
    fn test_spatial_triples() {
        let solution = identity_solution(3, 5, Geometry::Linear);
        assert!(Clue::TransitiveSpatialLink(item("0b"), item("1c"), item("2d")).is_true_of(&solution));
        assert!(!Clue::TransitiveSpatialLink(item("0d"), item("1c"), item("2b")).is_true_of(&solution));
        assert!(Clue::ThreeInARow(item("0d"), item("1c"), item("2b")).is_true_of(&solution));
        assert!(!Clue::ThreeInARow(item("0a"), item("1c"), item("2d")).is_true_of(&solution));
        assert!(Clue::OrderedChain(item("0a"), item("1c"), item("2d")).is_true_of(&solution));
        assert!(!Clue::OrderedChain(item("0c"), item("1a"), item("2d")).is_true_of(&solution));
    }

    #[test]
    fn test_numeric_clues() {
        let solution = identity_solution(2, 5, Geometry::Linear);
        assert!(Clue::AtEdge(item("0a")).is_true_of(&solution));
        assert!(Clue::AtEdge(item("1e")).is_true_of(&solution));
        assert!(!Clue::AtEdge(item("1c")).is_true_of(&solution));
        // one-based position 2
        assert!(Clue::IsEven { item: item("0b"), even: true }.is_true_of(&solution));
        assert!(Clue::IsEven { item: item("0c"), even: false }.is_true_of(&solution));
        assert!(Clue::SumEquals { a: item("0a"), b: item("1c"), sum: 4 }.is_true_of(&solution));
        assert!(Clue::DistanceGreaterThan { a: item("0a"), b: item("1d"), distance: 2 }
            .is_true_of(&solution));
        assert!(!Clue::DistanceGreaterThan { a: item("0a"), b: item("1c"), distance: 2 }
            .is_true_of(&solution));
    }

    #[test]
    fn test_compound_clues() {
        let solution = identity_solution(2, 4, Geometry::Linear);
        let yes = Fact::At { item: item("0a"), position: 0 };
        let no = Fact::Together(item("0a"), item("1b"));
        assert!(yes.is_true_of(&solution));
        assert!(!no.is_true_of(&solution));

        assert!(Clue::EitherOr(yes, no).is_true_of(&solution));
        assert!(!Clue::EitherOr(yes, yes).is_true_of(&solution));
        assert!(Clue::IfAndOnlyIf(no, no).is_true_of(&solution));
        assert!(!Clue::IfAndOnlyIf(yes, no).is_true_of(&solution));
        assert!(Clue::IfThen(no, yes).is_true_of(&solution));
        assert!(Clue::IfThen(no, no).is_true_of(&solution));
        assert!(!Clue::IfThen(yes, no).is_true_of(&solution));
        assert!(Clue::NeitherNorPosition { items: [item("0b"), item("1c")], position: 0 }
            .is_true_of(&solution));
    }

    #[test]
    fn test_items_deduplicated() {
        let clue = Clue::EitherOr(
            Fact::At { item: item("0a"), position: 1 },
            Fact::Together(item("0a"), item("1b")),
        );
        assert_eq!(clue.items(), vec![item("0a"), item("1b")]);
        assert_eq!(clue.positions(), vec![1]);
    }

    #[test]
    fn test_states_link() {
        let clue = Clue::DirectLink(item("0a"), item("1b"));
        assert!(clue.states_link(item("1b"), item("0a")));
        assert!(!clue.states_link(item("0a"), item("1c")));
        assert!(!Clue::NegativeDirectLink(item("0a"), item("1b")).states_link(item("0a"), item("1b")));
    }

    #[test]
    fn test_strength_ranks() {
        assert_eq!(ClueType::Positional.strength(), 1);
        assert_eq!(ClueType::DirectLink.strength(), 2);
        assert_eq!(ClueType::TransitiveSpatialLink.strength(), 3);
        assert!(ClueType::all().iter().all(|t| (1..=3).contains(&t.strength())));
    }

    #[test]
    fn test_display() {
        assert_eq!(Clue::Positional { position: 0, item: item("0c") }.to_string(), "0c@1");
        assert_eq!(Clue::RelativePosition(item("0a"), item("1b")).to_string(), "0a>>1b");
    }
}
