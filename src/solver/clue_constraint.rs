use crate::model::{Clue, Geometry, Item, PositionSet, PuzzleShape};

/// Unary constraint trait: restricts the positions of one item.
pub trait UnaryConstraint: std::fmt::Debug {
    fn var(&self) -> Item;
    fn valid(&self, position: usize) -> bool;
}

/// Binary constraint trait: relates two items.
pub trait BinaryConstraint: std::fmt::Debug {
    /// Returns the two items involved in the constraint.
    fn vars(&self) -> (Item, Item);
    /// Checks whether the constraint is satisfied for a pair of positions.
    fn valid(&self, x: usize, y: usize) -> bool;
}

/// N-ary constraint trait: relates three or more items.
pub trait NaryConstraint: std::fmt::Debug {
    /// Returns the items involved in the constraint, without duplicates.
    fn vars(&self) -> Vec<Item>;
    /// Checks whether the constraint is satisfied; `positions` lines up with `vars()`.
    fn valid(&self, positions: &[usize]) -> bool;
}

#[derive(Debug, Clone)]
pub struct AllowedPositionsConstraint {
    pub item: Item,
    pub allowed: PositionSet,
}

impl UnaryConstraint for AllowedPositionsConstraint {
    fn var(&self) -> Item {
        self.item
    }

    fn valid(&self, position: usize) -> bool {
        self.allowed.contains(position)
    }
}

#[derive(Debug, Clone)]
pub struct SamePositionConstraint {
    pub item_a: Item,
    pub item_b: Item,
}

impl BinaryConstraint for SamePositionConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        pos_a == pos_b
    }
}

#[derive(Debug, Clone)]
pub struct DifferentPositionConstraint {
    pub item_a: Item,
    pub item_b: Item,
}

impl BinaryConstraint for DifferentPositionConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        pos_a != pos_b
    }
}

/// `item_b` is directly after `item_a`.
#[derive(Debug, Clone)]
pub struct NextPositionConstraint {
    pub item_a: Item,
    pub item_b: Item,
    pub n_positions: usize,
    pub geometry: Geometry,
}

impl BinaryConstraint for NextPositionConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        self.geometry.next(pos_a, self.n_positions) == Some(pos_b)
    }
}

#[derive(Debug, Clone)]
pub struct OppositeConstraint {
    pub item_a: Item,
    pub item_b: Item,
    pub n_positions: usize,
}

impl BinaryConstraint for OppositeConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        pos_a.abs_diff(pos_b) * 2 == self.n_positions
    }
}

#[derive(Debug, Clone)]
pub struct LessThanConstraint {
    pub item_a: Item,
    pub item_b: Item,
}

impl BinaryConstraint for LessThanConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        pos_a < pos_b
    }
}

#[derive(Debug, Clone)]
pub struct DistanceGreaterThanConstraint {
    pub item_a: Item,
    pub item_b: Item,
    pub distance: usize,
}

impl BinaryConstraint for DistanceGreaterThanConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        pos_a.abs_diff(pos_b) > self.distance
    }
}

/// One-based positions add up to `sum`.
#[derive(Debug, Clone)]
pub struct SumConstraint {
    pub item_a: Item,
    pub item_b: Item,
    pub sum: usize,
}

impl BinaryConstraint for SumConstraint {
    fn vars(&self) -> (Item, Item) {
        (self.item_a, self.item_b)
    }

    fn valid(&self, pos_a: usize, pos_b: usize) -> bool {
        pos_a + pos_b + 2 == self.sum
    }
}

#[derive(Debug, Clone)]
pub struct ThreeInARowConstraint {
    pub items: [Item; 3],
}

impl NaryConstraint for ThreeInARowConstraint {
    fn vars(&self) -> Vec<Item> {
        self.items.to_vec()
    }

    fn valid(&self, positions: &[usize]) -> bool {
        let mut sorted = [positions[0], positions[1], positions[2]];
        sorted.sort_unstable();
        sorted[1] == sorted[0] + 1 && sorted[2] == sorted[1] + 1
    }
}

/// Falls back to the clue's own predicate. Used for compound clues whose
/// truth depends on several facts at once.
#[derive(Debug, Clone)]
pub struct ClueRuleConstraint {
    pub clue: Clue,
    pub shape: PuzzleShape,
    items: Vec<Item>,
}

impl ClueRuleConstraint {
    pub fn new(clue: &Clue, shape: &PuzzleShape) -> Self {
        Self {
            clue: clue.clone(),
            shape: *shape,
            items: clue.items(),
        }
    }
}

impl NaryConstraint for ClueRuleConstraint {
    fn vars(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn valid(&self, positions: &[usize]) -> bool {
        let position_of = |item: Item| {
            let slot = self.items.iter().position(|&i| i == item).unwrap_or(0);
            positions[slot]
        };
        self.clue.holds(&self.shape, &position_of)
    }
}

#[derive(Debug, Default)]
pub struct ConstraintSet {
    pub unary_constraints: Vec<Box<dyn UnaryConstraint>>,
    pub binary_constraints: Vec<Box<dyn BinaryConstraint>>,
    pub nary_constraints: Vec<Box<dyn NaryConstraint>>,
}

impl ConstraintSet {
    fn allow(&mut self, item: Item, allowed: PositionSet) {
        self.unary_constraints
            .push(Box::new(AllowedPositionsConstraint { item, allowed }));
    }

    fn binary<C: BinaryConstraint + 'static>(&mut self, constraint: C) {
        self.binary_constraints.push(Box::new(constraint));
    }

    pub fn extend(&mut self, other: ConstraintSet) {
        self.unary_constraints.extend(other.unary_constraints);
        self.binary_constraints.extend(other.binary_constraints);
        self.nary_constraints.extend(other.nary_constraints);
    }

    pub fn len(&self) -> usize {
        self.unary_constraints.len() + self.binary_constraints.len() + self.nary_constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Translates one clue into solver constraints over item positions.
pub fn create_clue_constraints(clue: &Clue, shape: &PuzzleShape) -> ConstraintSet {
    let n = shape.n_positions;
    let mut constraints = ConstraintSet::default();
    match clue {
        Clue::Positional { position, item } => {
            constraints.allow(*item, PositionSet::single(*position));
        }
        Clue::DirectLink(a, b) | Clue::ConditionalLink(a, b) => {
            constraints.binary(SamePositionConstraint {
                item_a: *a,
                item_b: *b,
            });
        }
        Clue::NegativeDirectLink(a, b) => {
            constraints.binary(DifferentPositionConstraint {
                item_a: *a,
                item_b: *b,
            });
        }
        Clue::RelativePosition(a, b) => {
            constraints.binary(NextPositionConstraint {
                item_a: *a,
                item_b: *b,
                n_positions: n,
                geometry: shape.geometry,
            });
        }
        Clue::OppositeLink(a, b) => {
            if shape.geometry.supports_opposite(n) {
                constraints.binary(OppositeConstraint {
                    item_a: *a,
                    item_b: *b,
                    n_positions: n,
                });
            } else {
                // no seat is opposite another one
                constraints.allow(*a, PositionSet::EMPTY);
            }
        }
        Clue::TransitiveSpatialLink(a, b, c) => {
            // the chain itself never wraps around
            for (x, y) in [(a, b), (b, c)] {
                constraints.binary(NextPositionConstraint {
                    item_a: *x,
                    item_b: *y,
                    n_positions: n,
                    geometry: Geometry::Linear,
                });
            }
        }
        Clue::ThreeInARow(a, b, c) => {
            constraints
                .nary_constraints
                .push(Box::new(ThreeInARowConstraint { items: [*a, *b, *c] }));
        }
        Clue::AtEdge(item) => {
            constraints.allow(*item, [0, n - 1].into_iter().collect());
        }
        Clue::IsEven { item, even } => {
            let allowed = (0..n).filter(|p| ((p + 1) % 2 == 0) == *even).collect();
            constraints.allow(*item, allowed);
        }
        Clue::DistanceGreaterThan { a, b, distance } => {
            constraints.binary(DistanceGreaterThanConstraint {
                item_a: *a,
                item_b: *b,
                distance: *distance,
            });
        }
        Clue::OrderedChain(a, b, c) => {
            for (x, y) in [(a, b), (b, c)] {
                constraints.binary(LessThanConstraint {
                    item_a: *x,
                    item_b: *y,
                });
            }
        }
        Clue::SumEquals { a, b, sum } => {
            constraints.binary(SumConstraint {
                item_a: *a,
                item_b: *b,
                sum: *sum,
            });
        }
        Clue::EitherOr(..) | Clue::IfAndOnlyIf(..) | Clue::IfThen(..) => {
            let rule = ClueRuleConstraint::new(clue, shape);
            if rule.items.len() == 1 {
                // both facts pin the same item; reduce to a unary constraint
                let item = rule.items[0];
                let allowed = (0..n)
                    .filter(|&p| rule.clue.holds(shape, &|_| p))
                    .collect();
                constraints.allow(item, allowed);
            } else {
                constraints.nary_constraints.push(Box::new(rule));
            }
        }
        Clue::NeitherNorPosition { items, position } => {
            let allowed = PositionSet::full(n).difference(PositionSet::single(*position));
            for item in items {
                constraints.allow(*item, allowed);
            }
        }
    }
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fact;

    fn item(s: &str) -> Item {
        Item::parse(s)
    }

    #[test]
    fn test_positional_emits_single_position() {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let set = create_clue_constraints(&Clue::Positional { position: 2, item: item("1a") }, &shape);
        assert_eq!(set.unary_constraints.len(), 1);
        let constraint = &set.unary_constraints[0];
        assert_eq!(constraint.var(), item("1a"));
        assert!(constraint.valid(2));
        assert!(!constraint.valid(1));
    }

    #[test]
    fn test_relative_position_respects_geometry() {
        let clue = Clue::RelativePosition(item("0a"), item("1b"));
        let linear = create_clue_constraints(&clue, &PuzzleShape::new(2, 4, Geometry::Linear));
        let circular = create_clue_constraints(&clue, &PuzzleShape::new(2, 4, Geometry::Circular));
        assert!(!linear.binary_constraints[0].valid(3, 0));
        assert!(circular.binary_constraints[0].valid(3, 0));
        assert!(linear.binary_constraints[0].valid(1, 2));
    }

    #[test]
    fn test_transitive_link_is_two_next_constraints() {
        let shape = PuzzleShape::new(3, 4, Geometry::Circular);
        let set = create_clue_constraints(
            &Clue::TransitiveSpatialLink(item("0a"), item("1a"), item("2a")),
            &shape,
        );
        assert_eq!(set.binary_constraints.len(), 2);
        assert_eq!(set.binary_constraints[1].vars(), (item("1a"), item("2a")));
        assert!(!set.binary_constraints[0].valid(3, 0));
    }

    #[test]
    fn test_compound_on_single_item_becomes_unary() {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let clue = Clue::EitherOr(
            Fact::At { item: item("0a"), position: 0 },
            Fact::At { item: item("0a"), position: 3 },
        );
        let set = create_clue_constraints(&clue, &shape);
        assert!(set.nary_constraints.is_empty());
        let unary = &set.unary_constraints[0];
        assert!(unary.valid(0) && unary.valid(3));
        assert!(!unary.valid(1));
    }

    #[test]
    fn test_compound_rule_lines_up_positions() {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let clue = Clue::IfThen(
            Fact::At { item: item("0a"), position: 1 },
            Fact::Together(item("0a"), item("1c")),
        );
        let set = create_clue_constraints(&clue, &shape);
        let rule = &set.nary_constraints[0];
        assert_eq!(rule.vars(), vec![item("0a"), item("1c")]);
        assert!(rule.valid(&[1, 1]));
        assert!(!rule.valid(&[1, 2]));
        assert!(rule.valid(&[0, 2]));
    }
}
