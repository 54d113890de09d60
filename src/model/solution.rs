use std::fmt::Display;

use crate::model::{Geometry, Item, PuzzleShape};
use log::trace;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

pub const MAX_GRID_SIZE: usize = 16;

/// The hidden answer of a puzzle: for every category, which item sits at
/// which position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Solution {
    pub shape: PuzzleShape,
    grid: Vec<Vec<usize>>,      // [category][position] -> item index
    positions: Vec<Vec<usize>>, // [category][item index] -> position
}

impl Solution {
    /// Shuffles every category independently onto the positions.
    pub fn generate<R: Rng + ?Sized>(shape: PuzzleShape, rng: &mut R) -> Self {
        assert!(
            shape.n_positions <= MAX_GRID_SIZE,
            "n_positions must be <= {}",
            MAX_GRID_SIZE
        );

        let mut grid = Vec::with_capacity(shape.n_categories);
        for _ in 0..shape.n_categories {
            let mut row: Vec<usize> = (0..shape.n_positions).collect();
            row.shuffle(rng);
            grid.push(row);
        }
        trace!(target: "solution", "Solution grid: {:?}", grid);

        Self::from_grid(shape.geometry, grid)
    }

    /// Builds a solution from explicit rows. Every row must be a permutation
    /// of `0..n_positions`.
    pub fn from_grid(geometry: Geometry, grid: Vec<Vec<usize>>) -> Self {
        let n_categories = grid.len();
        let n_positions = grid.first().map(|row| row.len()).unwrap_or(0);
        let mut positions = vec![vec![0; n_positions]; n_categories];
        for (category, row) in grid.iter().enumerate() {
            assert_eq!(row.len(), n_positions, "ragged solution grid");
            for (position, &index) in row.iter().enumerate() {
                positions[category][index] = position;
            }
        }
        Self {
            shape: PuzzleShape::new(n_categories, n_positions, geometry),
            grid,
            positions,
        }
    }

    pub fn get(&self, category: usize, position: usize) -> Item {
        Item::new(category, self.grid[category][position])
    }

    pub fn position_of(&self, item: Item) -> usize {
        self.positions[item.category][item.index]
    }

    pub fn all_items(&self) -> Vec<Item> {
        self.shape.all_items().collect()
    }

    /// Whether every category is a bijection between items and positions.
    pub fn is_valid(&self) -> bool {
        self.grid.iter().all(|row| {
            let mut seen = vec![false; self.shape.n_positions];
            row.iter().all(|&index| {
                index < seen.len() && !std::mem::replace(&mut seen[index], true)
            })
        })
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();

        for category in 0..self.shape.n_categories {
            output.push_str(&format!("{}|", category));
            for position in 0..self.shape.n_positions {
                let item = self.get(category, position);
                output.push_str(&format!("{}|", item.letter().to_ascii_uppercase()));
            }
            output.push('\n');
            output.push_str(&"-".repeat(self.shape.n_positions * 2 + 2));
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}
