use serde::{Deserialize, Serialize};

use super::{Geometry, Item};

/// Dimensions of a puzzle grid: how many categories, how many positions
/// (which is also the number of items per category), and how the positions
/// are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PuzzleShape {
    pub n_categories: usize,
    pub n_positions: usize,
    pub geometry: Geometry,
}

impl PuzzleShape {
    pub fn new(n_categories: usize, n_positions: usize, geometry: Geometry) -> Self {
        Self {
            n_categories,
            n_positions,
            geometry,
        }
    }

    pub fn n_items(&self) -> usize {
        self.n_categories * self.n_positions
    }

    /// Dense index of an item, `0..n_items()`.
    pub fn item_index(&self, item: Item) -> usize {
        item.category * self.n_positions + item.index
    }

    pub fn item_at_index(&self, index: usize) -> Item {
        Item::new(index / self.n_positions, index % self.n_positions)
    }

    pub fn all_items(&self) -> impl Iterator<Item = Item> + '_ {
        (0..self.n_items()).map(|index| self.item_at_index(index))
    }

    pub fn category_items(&self, category: usize) -> impl Iterator<Item = Item> {
        (0..self.n_positions).map(move |index| Item::new(category, index))
    }
}
