use thiserror::Error;

use crate::model::ClueType;

/// The requested puzzle cannot be built from the given theme and profile.
/// Raised before any solving starts and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Theme has {available} categories but {required} were requested")]
    NotEnoughCategories { available: usize, required: usize },

    #[error("Category '{category}' has {available} items but the grid needs {required}")]
    NotEnoughItems {
        category: String,
        available: usize,
        required: usize,
    },

    #[error("Category '{category}' contains duplicate item '{item}'")]
    DuplicateItem { category: String, item: String },

    #[error("Grid size {n_positions} is outside the supported range {min}..={max}")]
    GridSize {
        n_positions: usize,
        min: usize,
        max: usize,
    },

    #[error("A puzzle needs at least 2 categories, got {0}")]
    TooFewCategories(usize),

    #[error("Recipe asks for {0:?}, which is also forbidden by the profile")]
    ForbiddenRecipeEntry(ClueType),
}

/// Why a single generation attempt was abandoned. The orchestrator absorbs
/// these and retries with a fresh solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("clue set has no consistent solution")]
    Contradiction,

    #[error("ran out of clues before the solution became unique")]
    Exhaustion,

    #[error("puzzle rejected by quality audit: {0}")]
    Quality(String),
}

/// Terminal result of [`crate::generator::PuzzleGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Gave up after {attempts} attempts; last failure: {last}")]
    RetriesExhausted {
        attempts: usize,
        last: AttemptFailure,
    },
}

/// Loading or saving settings and themes.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = GenerationError> = std::result::Result<T, E>;
