use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::{solution::MAX_GRID_SIZE, ClueType, Geometry, PuzzleShape};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Classic,
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![
            Difficulty::Classic,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            Difficulty::Classic => 0,
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Expert => 4,
        }
    }

    pub fn from_index(index: usize) -> Difficulty {
        match index {
            0 => Difficulty::Classic,
            1 => Difficulty::Easy,
            2 => Difficulty::Medium,
            3 => Difficulty::Hard,
            4 => Difficulty::Expert,
            _ => Difficulty::Easy,
        }
    }

    pub fn grid_size(&self) -> usize {
        match self {
            Difficulty::Classic => 4,
            Difficulty::Easy => 4,
            Difficulty::Medium => 5,
            Difficulty::Hard => 6,
            Difficulty::Expert => 6,
        }
    }

    pub fn n_categories(&self) -> usize {
        match self {
            Difficulty::Classic => 3,
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 4,
            Difficulty::Expert => 5,
        }
    }

    pub fn geometry(&self) -> Geometry {
        match self {
            Difficulty::Classic | Difficulty::Easy | Difficulty::Medium => Geometry::Linear,
            Difficulty::Hard | Difficulty::Expert => Geometry::Circular,
        }
    }

    /// Skeleton recipe: how many clues of each type to start from.
    pub fn recipe(&self) -> BTreeMap<ClueType, usize> {
        let entries: &[(ClueType, usize)] = match self {
            Difficulty::Classic => &[
                (ClueType::Positional, 1),
                (ClueType::DirectLink, 2),
                (ClueType::RelativePosition, 1),
            ],
            Difficulty::Easy => &[
                (ClueType::Positional, 1),
                (ClueType::DirectLink, 2),
                (ClueType::NegativeDirectLink, 1),
                (ClueType::AtEdge, 1),
            ],
            Difficulty::Medium => &[
                (ClueType::RelativePosition, 2),
                (ClueType::ConditionalLink, 1),
                (ClueType::NegativeDirectLink, 2),
                (ClueType::IsEven, 1),
                (ClueType::OrderedChain, 1),
                (ClueType::ThreeInARow, 1),
            ],
            Difficulty::Hard => &[
                (ClueType::TransitiveSpatialLink, 1),
                (ClueType::OppositeLink, 1),
                (ClueType::ConditionalLink, 2),
                (ClueType::RelativePosition, 2),
                (ClueType::EitherOr, 1),
                (ClueType::SumEquals, 1),
                (ClueType::NeitherNorPosition, 1),
            ],
            Difficulty::Expert => &[
                (ClueType::TransitiveSpatialLink, 2),
                (ClueType::OppositeLink, 2),
                (ClueType::ConditionalLink, 2),
                (ClueType::IfAndOnlyIf, 1),
                (ClueType::EitherOr, 1),
                (ClueType::IfThen, 1),
                (ClueType::DistanceGreaterThan, 1),
            ],
        };
        entries.iter().copied().collect()
    }

    /// Clue types that never appear in a puzzle of this tier.
    pub fn forbidden(&self) -> BTreeSet<ClueType> {
        match self {
            Difficulty::Classic => ClueType::all()
                .into_iter()
                .filter(|clue_type| {
                    !matches!(
                        clue_type,
                        ClueType::Positional
                            | ClueType::DirectLink
                            | ClueType::NegativeDirectLink
                            | ClueType::RelativePosition
                            | ClueType::OrderedChain
                            | ClueType::AtEdge
                            | ClueType::IsEven
                    )
                })
                .collect(),
            Difficulty::Expert => [ClueType::DirectLink].into_iter().collect(),
            _ => BTreeSet::new(),
        }
    }

    pub fn build_order(&self) -> BuildOrder {
        match self {
            Difficulty::Classic | Difficulty::Easy => BuildOrder::SimpleFirst,
            _ => BuildOrder::ComplexFirst,
        }
    }

    /// Minimum number of search branches the exact solver must explore before
    /// a puzzle counts as hard enough.
    pub fn min_branches(&self) -> usize {
        match self {
            Difficulty::Classic | Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
            Difficulty::Expert => 3,
        }
    }

    pub fn min_question_depth(&self) -> usize {
        match self {
            Difficulty::Classic | Difficulty::Easy => 0,
            Difficulty::Medium | Difficulty::Hard => 2,
            Difficulty::Expert => 3,
        }
    }

    pub fn profile(&self) -> DifficultyProfile {
        DifficultyProfile {
            difficulty: *self,
            n_positions: self.grid_size(),
            n_categories: self.n_categories(),
            geometry: self.geometry(),
            recipe: self.recipe(),
            build_order: self.build_order(),
            forbidden: self.forbidden(),
            protect_skeleton: matches!(self, Difficulty::Hard | Difficulty::Expert),
            min_branches: self.min_branches(),
            min_question_depth: self.min_question_depth(),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts a tier name in any case, or its index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Ok(Difficulty::from_index(index));
        }
        Difficulty::all()
            .into_iter()
            .find(|difficulty| format!("{:?}", difficulty).eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty '{}'", s))
    }
}

/// Which bucket of remaining clues the uniqueness search drains first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BuildOrder {
    SimpleFirst,
    ComplexFirst,
}

/// Everything the generator needs to know about the puzzle it should build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyProfile {
    #[serde(default)]
    pub difficulty: Difficulty,
    pub n_positions: usize,
    pub n_categories: usize,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub recipe: BTreeMap<ClueType, usize>,
    #[serde(default = "default_build_order")]
    pub build_order: BuildOrder,
    #[serde(default)]
    pub forbidden: BTreeSet<ClueType>,
    /// Keep every skeleton clue through minimization, not just the anchors.
    #[serde(default)]
    pub protect_skeleton: bool,
    #[serde(default)]
    pub min_branches: usize,
    #[serde(default)]
    pub min_question_depth: usize,
}

fn default_build_order() -> BuildOrder {
    BuildOrder::SimpleFirst
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::default().profile()
    }
}

impl DifficultyProfile {
    pub fn shape(&self) -> PuzzleShape {
        PuzzleShape::new(self.n_categories, self.n_positions, self.geometry)
    }

    pub fn allows(&self, clue_type: ClueType) -> bool {
        !self.forbidden.contains(&clue_type)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(2..=MAX_GRID_SIZE).contains(&self.n_positions) {
            return Err(ConfigurationError::GridSize {
                n_positions: self.n_positions,
                min: 2,
                max: MAX_GRID_SIZE,
            });
        }
        if self.n_categories < 2 {
            return Err(ConfigurationError::TooFewCategories(self.n_categories));
        }
        for (&clue_type, &count) in &self.recipe {
            if count > 0 && self.forbidden.contains(&clue_type) {
                return Err(ConfigurationError::ForbiddenRecipeEntry(clue_type));
            }
        }
        Ok(())
    }
}
