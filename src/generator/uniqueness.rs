use log::{debug, info, trace};
use rand::{seq::SliceRandom, Rng};

use crate::{
    error::AttemptFailure,
    model::{BuildOrder, Clue, DifficultyProfile, PuzzleShape},
    solver::{Classification, ConstraintSolver, PropagationClassifier, PropagationOutcome},
};

/// Orders the remaining clues the way the profile asks: two buckets,
/// shuffled, with recipe types moved to the front of each.
pub fn order_candidates<R: Rng + ?Sized>(
    profile: &DifficultyProfile,
    remaining: Vec<Clue>,
    rng: &mut R,
) -> Vec<Clue> {
    let (mut simple, mut complex): (Vec<Clue>, Vec<Clue>) = remaining
        .into_iter()
        .filter(|clue| profile.allows(clue.clue_type()))
        .partition(|clue| clue.clue_type().is_simple());

    for bucket in [&mut simple, &mut complex] {
        bucket.shuffle(rng);
        bucket.sort_by_key(|clue| !profile.recipe.contains_key(&clue.clue_type()));
    }

    match profile.build_order {
        BuildOrder::SimpleFirst => simple.into_iter().chain(complex).collect(),
        BuildOrder::ComplexFirst => complex.into_iter().chain(simple).collect(),
    }
}

/// Adds clues in batches until the solver reports exactly one solution.
pub struct UniquenessBuilder<'a, S: ConstraintSolver> {
    solver: &'a S,
    precheck: PropagationClassifier,
    batch_size: usize,
}

impl<'a, S: ConstraintSolver> UniquenessBuilder<'a, S> {
    pub fn new(solver: &'a S, batch_size: usize) -> Self {
        Self {
            solver,
            precheck: PropagationClassifier,
            batch_size: batch_size.max(1),
        }
    }

    pub fn build(
        &self,
        shape: &PuzzleShape,
        mut clues: Vec<Clue>,
        candidates: Vec<Clue>,
    ) -> Result<Vec<Clue>, AttemptFailure> {
        if self.solver.classify(shape, &clues) == Classification::One {
            return Ok(clues);
        }

        for (batch_index, batch) in candidates.chunks(self.batch_size).enumerate() {
            let mark = clues.len();
            clues.extend_from_slice(batch);

            if self.precheck.propagate(shape, &clues).outcome == PropagationOutcome::Contradiction {
                debug!(target: "uniqueness", "Batch {} contradicts, rolling back", batch_index);
                clues.truncate(mark);
                continue;
            }

            match self.solver.classify(shape, &clues) {
                Classification::Zero => {
                    // Universe clues all hold for the solution, so this needs a
                    // solver the precheck disagrees with. Drop the batch and
                    // carry on with the next one in the same ordering.
                    debug!(target: "uniqueness", "Batch {} has no solution, rolling back", batch_index);
                    clues.truncate(mark);
                }
                Classification::One => {
                    info!(
                        target: "uniqueness",
                        "Unique after {} batches with {} clues",
                        batch_index + 1,
                        clues.len()
                    );
                    return Ok(clues);
                }
                Classification::Many => {
                    trace!(target: "uniqueness", "Still ambiguous with {} clues", clues.len());
                }
            }
        }

        debug!(target: "uniqueness", "Candidates exhausted with {} clues", clues.len());
        Err(AttemptFailure::Exhaustion)
    }
}
