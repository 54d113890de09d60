mod clue;
mod difficulty;
mod geometry;
mod item;
mod position_set;
mod puzzle;
mod shape;
pub mod solution;
mod theme;

pub use clue::{Clue, ClueType, Fact};
pub use difficulty::{BuildOrder, Difficulty, DifficultyProfile};
pub use geometry::Geometry;
pub use item::Item;
pub use position_set::PositionSet;
pub use puzzle::{Puzzle, Question};
pub use shape::PuzzleShape;
pub use solution::Solution;
pub use solution::MAX_GRID_SIZE;
pub use theme::{Category, Theme};
