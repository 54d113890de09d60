mod clue_constraint;
mod exact;
mod propagation;
mod propagator;

use crate::model::{Clue, PuzzleShape};

pub use clue_constraint::{create_clue_constraints, ConstraintSet};
pub use exact::{ClassifyReport, ExactClassifier, DEFAULT_TIMEOUT};
pub use propagation::{PropagationClassifier, PropagationOutcome, PropagationReport};
pub use propagator::{Contradiction, Propagator};

/// How many assignments satisfy a clue set, capped at two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Zero,
    One,
    Many,
}

/// Anything that can tell whether a clue set pins down exactly one solution.
pub trait ConstraintSolver {
    fn classify(&self, shape: &PuzzleShape, clues: &[Clue]) -> Classification;
}
