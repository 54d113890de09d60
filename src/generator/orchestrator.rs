use std::cell::Cell;
use std::collections::HashSet;

use log::{debug, info, warn};
use rand::{
    rngs::StdRng,
    seq::{index::sample, IndexedRandom},
    Rng, RngCore, SeedableRng,
};

use crate::{
    error::{AttemptFailure, ConfigurationError, GenerationError},
    model::{Category, Clue, DifficultyProfile, Item, Puzzle, PuzzleShape, Question, Solution, Theme},
    solver::{Classification, ConstraintSolver, ExactClassifier},
};

use super::{
    auditor::QualityAuditor, clue_universe::ClueUniverse, minimizer::minimize,
    settings::GeneratorSettings, skeleton::design_skeleton,
    uniqueness::{order_candidates, UniquenessBuilder},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Start,
    SolutionReady,
    SkeletonBuilt,
    Unique,
    Minimized,
    Audited,
    Success,
    Retry,
    FatalFailure,
}

#[derive(Debug, Default, Clone)]
pub struct GenerationStats {
    pub attempts: usize,
    pub contradictions: usize,
    pub exhaustions: usize,
    pub quality_rejections: usize,
    pub classify_calls: usize,
}

impl GenerationStats {
    fn record(&mut self, failure: &AttemptFailure) {
        match failure {
            AttemptFailure::Contradiction => self.contradictions += 1,
            AttemptFailure::Exhaustion => self.exhaustions += 1,
            AttemptFailure::Quality(_) => self.quality_rejections += 1,
        }
    }
}

/// Counts how often the wrapped solver is consulted.
struct CountingSolver<'a, S: ConstraintSolver> {
    inner: &'a S,
    calls: Cell<usize>,
}

impl<'a, S: ConstraintSolver> ConstraintSolver for CountingSolver<'a, S> {
    fn classify(&self, shape: &PuzzleShape, clues: &[Clue]) -> Classification {
        self.calls.set(self.calls.get() + 1);
        self.inner.classify(shape, clues)
    }
}

pub struct PuzzleGenerator {
    settings: GeneratorSettings,
    profile: DifficultyProfile,
    classifier: ExactClassifier,
}

impl PuzzleGenerator {
    /// Uses the built-in profile of `settings.difficulty`.
    pub fn new(settings: GeneratorSettings) -> Self {
        let profile = settings.difficulty.profile();
        Self::with_profile(settings, profile)
    }

    pub fn with_profile(settings: GeneratorSettings, profile: DifficultyProfile) -> Self {
        let classifier = ExactClassifier::new(settings.solver_timeout());
        Self {
            settings,
            profile,
            classifier,
        }
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn generate(&self, theme: &Theme) -> Result<Puzzle, GenerationError> {
        let mut state = GenerationState::Start;
        let categories = match self.check_theme(theme) {
            Ok(categories) => categories,
            Err(e) => {
                self.transition(&mut state, GenerationState::FatalFailure);
                return Err(e.into());
            }
        };

        let seed = self.settings.seed.unwrap_or_else(|| rand::rng().next_u64());
        info!(
            target: "orchestrator",
            "Generating {:?} puzzle from theme '{}' with seed {}",
            self.profile.difficulty, theme.name, seed
        );
        let mut rng = StdRng::seed_from_u64(seed);
        let categories = Self::sample_categories(&categories, &self.profile, &mut rng);

        let mut stats = GenerationStats::default();
        let mut last = AttemptFailure::Exhaustion;
        for attempt in 1..=self.settings.max_retries {
            stats.attempts = attempt;
            let mut attempt_rng = StdRng::seed_from_u64(rng.next_u64());
            match self.attempt(&mut state, &categories, &mut attempt_rng, &mut stats) {
                Ok(mut puzzle) => {
                    self.transition(&mut state, GenerationState::Success);
                    puzzle.seed = seed;
                    info!(target: "orchestrator", "Generation stats: {:?}", stats);
                    return Ok(puzzle);
                }
                Err(failure) => {
                    warn!(target: "orchestrator", "Attempt {} failed: {}", attempt, failure);
                    stats.record(&failure);
                    last = failure;
                    self.transition(&mut state, GenerationState::Retry);
                }
            }
        }

        self.transition(&mut state, GenerationState::FatalFailure);
        info!(target: "orchestrator", "Generation stats: {:?}", stats);
        Err(GenerationError::RetriesExhausted {
            attempts: self.settings.max_retries,
            last,
        })
    }

    fn transition(&self, state: &mut GenerationState, next: GenerationState) {
        debug!(target: "orchestrator", "{:?} -> {:?}", state, next);
        *state = next;
    }

    /// Validates the profile against the theme. Every category must fill a
    /// row of the grid.
    fn check_theme<'t>(&self, theme: &'t Theme) -> Result<Vec<&'t Category>, ConfigurationError> {
        let profile = &self.profile;
        profile.validate()?;

        for category in &theme.categories {
            let mut seen = HashSet::new();
            if let Some(item) = category.items.iter().find(|item| !seen.insert(*item)) {
                return Err(ConfigurationError::DuplicateItem {
                    category: category.name.clone(),
                    item: item.clone(),
                });
            }
        }

        if let Some(short) = theme
            .categories
            .iter()
            .find(|category| category.items.len() < profile.n_positions)
        {
            return Err(ConfigurationError::NotEnoughItems {
                category: short.name.clone(),
                available: short.items.len(),
                required: profile.n_positions,
            });
        }
        if theme.categories.len() < profile.n_categories {
            return Err(ConfigurationError::NotEnoughCategories {
                available: theme.categories.len(),
                required: profile.n_categories,
            });
        }
        Ok(theme.categories.iter().collect())
    }

    fn sample_categories<R: Rng + ?Sized>(
        categories: &[&Category],
        profile: &DifficultyProfile,
        rng: &mut R,
    ) -> Vec<Category> {
        sample(rng, categories.len(), profile.n_categories)
            .into_iter()
            .map(|index| {
                let category = categories[index];
                let items = sample(rng, category.items.len(), profile.n_positions)
                    .into_iter()
                    .map(|i| category.items[i].clone())
                    .collect();
                Category {
                    name: category.name.clone(),
                    items,
                }
            })
            .collect()
    }

    /// Picks a random subject and attribute, and reads the answer off the solution.
    fn preferred_question<R: Rng + ?Sized>(solution: &Solution, rng: &mut R) -> Question {
        let shape = &solution.shape;
        let subject = Item::new(
            rng.random_range(0..shape.n_categories),
            rng.random_range(0..shape.n_positions),
        );
        let others: Vec<usize> = (0..shape.n_categories)
            .filter(|&category| category != subject.category)
            .collect();
        let attribute = others.choose(rng).copied().unwrap_or(subject.category);
        Question::new(subject, solution.get(attribute, solution.position_of(subject)))
    }

    fn attempt(
        &self,
        state: &mut GenerationState,
        categories: &[Category],
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) -> Result<Puzzle, AttemptFailure> {
        let solver = CountingSolver {
            inner: &self.classifier,
            calls: Cell::new(0),
        };
        let result = self.run_pipeline(state, categories, rng, &solver);
        stats.classify_calls += solver.calls.get();
        result
    }

    fn run_pipeline(
        &self,
        state: &mut GenerationState,
        categories: &[Category],
        rng: &mut StdRng,
        solver: &CountingSolver<'_, ExactClassifier>,
    ) -> Result<Puzzle, AttemptFailure> {
        let profile = &self.profile;
        self.transition(state, GenerationState::Start);

        let solution = Solution::generate(profile.shape(), rng);
        debug!(target: "orchestrator", "Solution:\n{}", solution);
        self.transition(state, GenerationState::SolutionReady);

        let preferred = Self::preferred_question(&solution, rng);
        let mut universe = ClueUniverse::generate(&solution, rng);
        universe.retain_types(|clue_type| profile.allows(clue_type));
        universe.remove_links(preferred.subject, preferred.answer);

        let skeleton = design_skeleton(&mut universe, &solution, profile, solver)?;
        self.transition(state, GenerationState::SkeletonBuilt);

        let candidates = order_candidates(profile, universe.drain(), rng);
        let unique = UniquenessBuilder::new(solver, self.settings.batch_size).build(
            &solution.shape,
            skeleton.clues.clone(),
            candidates,
        )?;
        self.transition(state, GenerationState::Unique);

        let protected = if profile.protect_skeleton {
            skeleton.clues
        } else {
            skeleton.anchors
        };
        let clues = minimize(solver, &solution.shape, unique, &protected);
        self.transition(state, GenerationState::Minimized);

        let audit = QualityAuditor::new(&self.classifier).audit(
            &solution,
            &clues,
            profile,
            preferred,
            rng,
        )?;
        self.transition(state, GenerationState::Audited);

        Ok(Puzzle {
            categories: categories.to_vec(),
            clues,
            anchors: protected,
            solution,
            question: audit.question,
            branches: audit.branches,
            difficulty: profile.difficulty,
            seed: 0,
        })
    }
}
