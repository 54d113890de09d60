mod auditor;
mod clue_universe;
mod minimizer;
mod orchestrator;
mod settings;
mod skeleton;
mod uniqueness;

pub use auditor::{Audit, InferenceGraph, QualityAuditor};
pub use clue_universe::ClueUniverse;
pub use minimizer::minimize;
pub use orchestrator::{GenerationState, GenerationStats, PuzzleGenerator};
pub use settings::GeneratorSettings;
pub use skeleton::{anchors, design_skeleton, Skeleton};
pub use uniqueness::{order_candidates, UniquenessBuilder};
