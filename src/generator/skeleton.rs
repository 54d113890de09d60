use log::{debug, info, warn};

use crate::{
    error::AttemptFailure,
    model::{Clue, DifficultyProfile, Geometry, Solution},
    solver::{Classification, ConstraintSolver},
};

use super::clue_universe::ClueUniverse;

/// The opening clue set of an attempt.
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Clues that fix the frame of reference and survive minimization.
    pub anchors: Vec<Clue>,
    /// Anchors followed by the recipe draws.
    pub clues: Vec<Clue>,
}

/// Clues that break the symmetry of the grid. A line needs its first item
/// pinned; a circle also needs a direction, or every rotation and reflection
/// would satisfy the same clues.
pub fn anchors(solution: &Solution) -> Vec<Clue> {
    let first = solution.get(0, 0);
    let mut anchors = vec![Clue::Positional {
        position: 0,
        item: first,
    }];
    if solution.shape.geometry == Geometry::Circular {
        anchors.push(Clue::RelativePosition(first, solution.get(1, 1)));
    }
    anchors
}

pub fn design_skeleton<S: ConstraintSolver>(
    universe: &mut ClueUniverse,
    solution: &Solution,
    profile: &DifficultyProfile,
    solver: &S,
) -> Result<Skeleton, AttemptFailure> {
    let anchors = anchors(solution);
    for anchor in &anchors {
        universe.remove(anchor);
    }

    let mut clues = anchors.clone();
    for (&clue_type, &count) in &profile.recipe {
        if !profile.allows(clue_type) {
            continue;
        }
        for drawn in 0..count {
            match universe.draw(clue_type) {
                Some(clue) => clues.push(clue),
                None => {
                    warn!(
                        target: "skeleton",
                        "No {:?} clues left after {} of {}",
                        clue_type, drawn, count
                    );
                    break;
                }
            }
        }
    }
    debug!(target: "skeleton", "Skeleton: {:?}", clues);

    if solver.classify(&solution.shape, &clues) == Classification::Zero {
        return Err(AttemptFailure::Contradiction);
    }
    info!(
        target: "skeleton",
        "Skeleton has {} clues ({} anchors)",
        clues.len(),
        anchors.len()
    );
    Ok(Skeleton { anchors, clues })
}
