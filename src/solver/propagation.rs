use log::debug;

use crate::model::{Clue, Item, PositionSet, PuzzleShape};

use super::{propagator::Propagator, Classification, ConstraintSolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// Some (category, position) cell or some item has no possibility left.
    Contradiction,
    /// Every cell has exactly one possible item.
    Solved,
    Unsolved,
}

#[derive(Debug, Clone)]
pub struct PropagationReport {
    pub outcome: PropagationOutcome,
    shape: PuzzleShape,
    domains: Vec<PositionSet>,
}

impl PropagationReport {
    /// Items that may still sit at `position` in `category`.
    pub fn possibilities(&self, category: usize, position: usize) -> Vec<Item> {
        self.shape
            .category_items(category)
            .filter(|&item| self.domains[self.shape.item_index(item)].contains(position))
            .collect()
    }

    fn assignment(&self) -> Option<Vec<usize>> {
        self.domains
            .iter()
            .map(|domain| domain.single_value())
            .collect()
    }
}

/// Fixpoint elimination without search. Cheap, and never wrong about
/// contradictions, but leaves many uniquely solvable clue sets `Unsolved`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagationClassifier;

impl PropagationClassifier {
    pub fn propagate(&self, shape: &PuzzleShape, clues: &[Clue]) -> PropagationReport {
        let mut propagator = Propagator::new(shape, clues);
        let consistent = propagator.propagate().is_ok();
        let mut report = PropagationReport {
            outcome: PropagationOutcome::Unsolved,
            shape: *shape,
            domains: propagator.domains().to_vec(),
        };

        let cell_sizes: Vec<usize> = (0..shape.n_categories)
            .flat_map(|category| (0..shape.n_positions).map(move |position| (category, position)))
            .map(|(category, position)| report.possibilities(category, position).len())
            .collect();

        report.outcome = if !consistent || cell_sizes.iter().any(|&size| size == 0) {
            PropagationOutcome::Contradiction
        } else if cell_sizes.iter().all(|&size| size == 1) {
            PropagationOutcome::Solved
        } else {
            PropagationOutcome::Unsolved
        };
        debug!(target: "propagator", "{} clues: {:?}", clues.len(), report.outcome);
        report
    }
}

impl ConstraintSolver for PropagationClassifier {
    fn classify(&self, shape: &PuzzleShape, clues: &[Clue]) -> Classification {
        let report = self.propagate(shape, clues);
        match report.outcome {
            PropagationOutcome::Contradiction => Classification::Zero,
            PropagationOutcome::Unsolved => Classification::Many,
            PropagationOutcome::Solved => match report.assignment() {
                Some(positions) => {
                    let position_of = |item: Item| positions[shape.item_index(item)];
                    if clues.iter().all(|clue| clue.holds(shape, &position_of)) {
                        Classification::One
                    } else {
                        Classification::Zero
                    }
                }
                None => Classification::Many,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fact, Geometry};
    use crate::solver::ExactClassifier;

    fn item(s: &str) -> Item {
        Item::parse(s)
    }

    #[test]
    fn test_contradiction() {
        let shape = PuzzleShape::new(2, 3, Geometry::Linear);
        let clues = vec![
            Clue::Positional {
                position: 2,
                item: item("0a"),
            },
            Clue::RelativePosition(item("0a"), item("1a")),
        ];
        let report = PropagationClassifier.propagate(&shape, &clues);
        assert_eq!(report.outcome, PropagationOutcome::Contradiction);
        assert_eq!(PropagationClassifier.classify(&shape, &clues), Classification::Zero);
    }

    #[test]
    fn test_solved_by_pins() {
        let shape = PuzzleShape::new(2, 2, Geometry::Linear);
        let clues = vec![
            Clue::Positional {
                position: 0,
                item: item("0b"),
            },
            Clue::DirectLink(item("0a"), item("1a")),
        ];
        let report = PropagationClassifier.propagate(&shape, &clues);
        assert_eq!(report.outcome, PropagationOutcome::Solved);
        assert_eq!(report.possibilities(1, 1), vec![item("1a")]);
        assert_eq!(PropagationClassifier.classify(&shape, &clues), Classification::One);
    }

    #[test]
    fn test_weaker_than_exact() {
        // unique, but only search can tell: no single elimination step applies
        let shape = PuzzleShape::new(1, 3, Geometry::Linear);
        let clues = vec![
            Clue::EitherOr(
                Fact::At {
                    item: item("0a"),
                    position: 0,
                },
                Fact::At {
                    item: item("0b"),
                    position: 0,
                },
            ),
            Clue::IfThen(
                Fact::At {
                    item: item("0b"),
                    position: 0,
                },
                Fact::At {
                    item: item("0a"),
                    position: 0,
                },
            ),
            Clue::IsEven {
                item: item("0c"),
                even: false,
            },
        ];
        assert_eq!(
            ExactClassifier::default().classify(&shape, &clues),
            Classification::One
        );
        let report = PropagationClassifier.propagate(&shape, &clues);
        assert_eq!(report.outcome, PropagationOutcome::Unsolved);
        assert_eq!(PropagationClassifier.classify(&shape, &clues), Classification::Many);
    }
}
