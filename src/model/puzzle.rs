use serde::{Deserialize, Serialize};

use crate::model::{Category, Clue, Difficulty, Item, Solution};

/// "Which <attribute category> belongs to <subject>?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub subject: Item,
    pub attribute_category: usize,
    pub answer: Item,
}

impl Question {
    pub fn new(subject: Item, answer: Item) -> Self {
        Self {
            subject,
            attribute_category: answer.category,
            answer,
        }
    }
}

/// A finished puzzle, ready to be handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// The categories in play, trimmed to the grid size. `Item` indexes into these.
    pub categories: Vec<Category>,
    pub clues: Vec<Clue>,
    /// Clues that were protected from minimization; all of them are also in `clues`.
    pub anchors: Vec<Clue>,
    pub solution: Solution,
    pub question: Question,
    /// Search branches the exact solver needed to prove uniqueness.
    pub branches: usize,
    pub difficulty: Difficulty,
    pub seed: u64,
}

impl Puzzle {
    pub fn label(&self, item: Item) -> &str {
        &self.categories[item.category].items[item.index]
    }

    pub fn category_name(&self, category: usize) -> &str {
        &self.categories[category].name
    }

    pub fn is_anchor(&self, clue: &Clue) -> bool {
        self.anchors.contains(clue)
    }
}
