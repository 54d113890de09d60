use log::{info, trace};

use crate::{
    model::{Clue, PuzzleShape},
    solver::{Classification, ConstraintSolver},
};

/// Drops every clue the puzzle stays unique without, weakest clues first.
/// Clues in `protected` are never tried. One pass suffices: removing a clue
/// only ever makes the remaining ones more necessary.
pub fn minimize<S: ConstraintSolver>(
    solver: &S,
    shape: &PuzzleShape,
    clues: Vec<Clue>,
    protected: &[Clue],
) -> Vec<Clue> {
    let mut candidates: Vec<usize> = (0..clues.len())
        .filter(|&i| !protected.contains(&clues[i]))
        .collect();
    candidates.sort_by_key(|&i| clues[i].strength());

    let mut kept = vec![true; clues.len()];
    for i in candidates {
        kept[i] = false;
        let trial: Vec<Clue> = clues
            .iter()
            .zip(&kept)
            .filter(|(_, keep)| **keep)
            .map(|(clue, _)| clue.clone())
            .collect();
        if solver.classify(shape, &trial) == Classification::One {
            trace!(target: "minimizer", "Removed redundant clue {:?}", clues[i]);
        } else {
            kept[i] = true;
        }
    }

    let before = clues.len();
    let minimized: Vec<Clue> = clues
        .into_iter()
        .zip(kept)
        .filter_map(|(clue, keep)| keep.then_some(clue))
        .collect();
    info!(
        target: "minimizer",
        "Minimization reduced clues from {} to {}",
        before,
        minimized.len()
    );
    minimized
}

#[cfg(test)]
mod tests {
    use test_context::test_context;

    use super::*;
    use crate::{
        model::{Geometry, Item},
        solver::ExactClassifier,
        tests::UsingLogger,
    };

    fn at(index: usize, position: usize) -> Clue {
        Clue::Positional {
            position,
            item: Item::new(0, index),
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_removes_redundant_clues(_: &mut UsingLogger) {
        let shape = PuzzleShape::new(1, 3, Geometry::Linear);
        let clues = vec![at(0, 0), at(1, 1), at(2, 2)];
        let solver = ExactClassifier::default();
        let minimized = minimize(&solver, &shape, clues, &[]);
        assert_eq!(minimized.len(), 2);
        assert_eq!(solver.classify(&shape, &minimized), Classification::One);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_keeps_protected_clue(_: &mut UsingLogger) {
        let shape = PuzzleShape::new(1, 3, Geometry::Linear);
        let clues = vec![at(0, 0), at(1, 1), at(2, 2)];
        let solver = ExactClassifier::default();
        let minimized = minimize(&solver, &shape, clues, &[at(0, 0)]);
        assert_eq!(minimized[0], at(0, 0));
        assert_eq!(minimized.len(), 2);
    }

    #[test]
    fn test_tries_weak_clues_first() {
        let shape = PuzzleShape::new(1, 3, Geometry::Linear);
        // the chain alone is unique, and both pins are tried before it
        let clues = vec![
            at(0, 0),
            Clue::OrderedChain(Item::new(0, 0), Item::new(0, 1), Item::new(0, 2)),
            at(1, 1),
        ];
        let solver = ExactClassifier::default();
        let minimized = minimize(&solver, &shape, clues, &[]);
        assert_eq!(
            minimized,
            vec![Clue::OrderedChain(Item::new(0, 0), Item::new(0, 1), Item::new(0, 2))]
        );
    }

    #[test]
    fn test_every_remaining_clue_is_needed() {
        let shape = PuzzleShape::new(2, 3, Geometry::Linear);
        let clues = vec![
            at(0, 0),
            at(1, 1),
            Clue::DirectLink(Item::new(0, 0), Item::new(1, 2)),
            Clue::DirectLink(Item::new(0, 1), Item::new(1, 0)),
            Clue::NegativeDirectLink(Item::new(0, 2), Item::new(1, 0)),
        ];
        let solver = ExactClassifier::default();
        let minimized = minimize(&solver, &shape, clues, &[]);
        assert_eq!(solver.classify(&shape, &minimized), Classification::One);
        for skip in 0..minimized.len() {
            let mut fewer = minimized.clone();
            fewer.remove(skip);
            assert_eq!(solver.classify(&shape, &fewer), Classification::Many);
        }
    }
}
