use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::model::{Clue, PuzzleShape};

use super::{propagator::Propagator, Classification, ConstraintSolver};

/// Search stops as soon as this many solutions have been seen.
const SOLUTION_LIMIT: usize = 2;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of an exact classification, with the effort it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyReport {
    pub classification: Classification,
    /// Search-tree children explored after propagation stalled.
    pub branches: usize,
    pub timed_out: bool,
}

/// Exact, bounded solution counter: propagation plus depth-first search on the
/// smallest open domain.
#[derive(Debug, Clone, Copy)]
pub struct ExactClassifier {
    pub timeout: Duration,
}

impl Default for ExactClassifier {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ExactClassifier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn classify_with_stats(&self, shape: &PuzzleShape, clues: &[Clue]) -> ClassifyReport {
        let started = Instant::now();
        let mut search = Search {
            deadline: started + self.timeout,
            solutions: 0,
            branches: 0,
            timed_out: false,
        };

        let mut root = Propagator::new(shape, clues);
        if root.propagate().is_ok() {
            search.explore(root);
        }

        let classification = match (search.solutions, search.timed_out) {
            (0, false) => Classification::Zero,
            (1, false) => Classification::One,
            // an unfinished search never proves uniqueness
            _ => Classification::Many,
        };
        debug!(
            target: "exact_solver",
            "{} clues: {:?} after {} branches in {:?}",
            clues.len(),
            classification,
            search.branches,
            started.elapsed()
        );

        ClassifyReport {
            classification,
            branches: search.branches,
            timed_out: search.timed_out,
        }
    }
}

impl ConstraintSolver for ExactClassifier {
    fn classify(&self, shape: &PuzzleShape, clues: &[Clue]) -> Classification {
        self.classify_with_stats(shape, clues).classification
    }
}

struct Search {
    deadline: Instant,
    solutions: usize,
    branches: usize,
    timed_out: bool,
}

impl Search {
    fn is_done(&self) -> bool {
        self.solutions >= SOLUTION_LIMIT || self.timed_out
    }

    /// `state` must already be propagated to a fixpoint.
    fn explore(&mut self, state: Propagator) {
        if self.is_done() {
            return;
        }
        if Instant::now() >= self.deadline {
            warn!(
                target: "exact_solver",
                "Time budget exhausted after {} branches; treating as ambiguous",
                self.branches
            );
            self.timed_out = true;
            return;
        }

        let Some(var) = state.branch_variable() else {
            trace!(target: "exact_solver", "Found solution {}", self.solutions + 1);
            self.solutions += 1;
            return;
        };

        let positions: Vec<usize> = state.domains()[var].iter().collect();
        for position in positions {
            self.branches += 1;
            let mut child = state.clone();
            if child.assign(var, position).is_ok() && child.propagate().is_ok() {
                self.explore(child);
            }
            if self.is_done() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_context::test_context;

    use super::*;
    use crate::{
        model::{Geometry, Item},
        tests::UsingLogger,
    };

    fn item(s: &str) -> Item {
        Item::parse(s)
    }

    /// Person = [A, B, C, D], Color = [Red, Blue, Green, Yellow], item index == position.
    fn pinned_chain_clues() -> Vec<Clue> {
        vec![
            Clue::Positional {
                position: 0,
                item: item("0a"),
            },
            Clue::RelativePosition(item("0a"), item("0b")),
            Clue::RelativePosition(item("0b"), item("0c")),
            Clue::DirectLink(item("0a"), item("1a")),
            Clue::DirectLink(item("0b"), item("1b")),
            Clue::ConditionalLink(item("0c"), item("1c")),
        ]
    }

    fn without_pin(clues: Vec<Clue>) -> Vec<Clue> {
        clues
            .into_iter()
            .filter(|clue| !matches!(clue, Clue::Positional { .. }))
            .collect()
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_unique_puzzle(_: &mut UsingLogger) {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let report = ExactClassifier::default().classify_with_stats(&shape, &pinned_chain_clues());
        assert_eq!(report.classification, Classification::One);
        assert!(!report.timed_out);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_removing_position_pin_is_ambiguous(_: &mut UsingLogger) {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let clues = without_pin(pinned_chain_clues());
        let classifier = ExactClassifier::default();
        assert_eq!(classifier.classify(&shape, &clues), Classification::Many);
    }

    #[test]
    fn test_no_clues_is_many_and_branches() {
        let shape = PuzzleShape::new(2, 3, Geometry::Linear);
        let report = ExactClassifier::default().classify_with_stats(&shape, &[]);
        assert_eq!(report.classification, Classification::Many);
        assert!(report.branches > 0);
    }

    #[test]
    fn test_contradiction_is_zero() {
        let shape = PuzzleShape::new(2, 3, Geometry::Linear);
        let clues = vec![
            Clue::DirectLink(item("0a"), item("1a")),
            Clue::NegativeDirectLink(item("0a"), item("1a")),
        ];
        assert_eq!(
            ExactClassifier::default().classify(&shape, &clues),
            Classification::Zero
        );
    }

    #[test]
    fn test_unfillable_position_is_zero() {
        // nobody can take the middle position
        let shape = PuzzleShape::new(1, 3, Geometry::Linear);
        let clues = vec![
            Clue::DistanceGreaterThan {
                a: item("0a"),
                b: item("0b"),
                distance: 1,
            },
            Clue::DistanceGreaterThan {
                a: item("0b"),
                b: item("0c"),
                distance: 1,
            },
        ];
        assert_eq!(
            ExactClassifier::default().classify(&shape, &clues),
            Classification::Zero
        );
    }

    #[test]
    fn test_zero_timeout_never_reports_one() {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let clues = pinned_chain_clues();
        let report = ExactClassifier::new(Duration::ZERO).classify_with_stats(&shape, &clues);
        assert_eq!(report.classification, Classification::Many);
        assert!(report.timed_out);
    }
}
