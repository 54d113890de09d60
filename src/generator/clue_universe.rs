use std::collections::{BTreeMap, VecDeque};

use itertools::Itertools;
use log::{debug, info};
use rand::{
    seq::{index::sample, SliceRandom},
    Rng,
};

use crate::model::{Clue, ClueType, Fact, Item, Solution};

/// Every true statement about one solution, split into shuffled per-type
/// queues. Drawing a clue moves it out of its queue.
#[derive(Debug, Clone, Default)]
pub struct ClueUniverse {
    pools: BTreeMap<ClueType, VecDeque<Clue>>,
}

impl ClueUniverse {
    pub fn generate<R: Rng + ?Sized>(solution: &Solution, rng: &mut R) -> Self {
        let mut generator = UniverseGenerator {
            solution,
            rng,
            clues: BTreeMap::new(),
        };
        generator.generate_all();

        let mut pools = BTreeMap::new();
        for (clue_type, mut clues) in generator.clues {
            clues.shuffle(generator.rng);
            pools.insert(clue_type, VecDeque::from(clues));
        }
        let universe = Self { pools };
        info!(
            target: "clue_universe",
            "Generated {} clues: {:?}",
            universe.len(),
            universe
                .pools
                .iter()
                .map(|(clue_type, pool)| (*clue_type, pool.len()))
                .collect::<Vec<_>>()
        );
        universe
    }

    /// Takes the next clue of the given type, if any are left.
    pub fn draw(&mut self, clue_type: ClueType) -> Option<Clue> {
        self.pools.get_mut(&clue_type)?.pop_front()
    }

    pub fn remove(&mut self, clue: &Clue) -> bool {
        let Some(pool) = self.pools.get_mut(&clue.clue_type()) else {
            return false;
        };
        let before = pool.len();
        pool.retain(|candidate| candidate != clue);
        pool.len() != before
    }

    /// Drops every clue that alone states that `a` and `b` share a position.
    pub fn remove_links(&mut self, a: Item, b: Item) -> usize {
        let mut removed = 0;
        for pool in self.pools.values_mut() {
            let before = pool.len();
            pool.retain(|clue| !clue.states_link(a, b));
            removed += before - pool.len();
        }
        debug!(target: "clue_universe", "Removed {} clues linking {} and {}", removed, a, b);
        removed
    }

    pub fn retain_types<F: Fn(ClueType) -> bool>(&mut self, keep: F) {
        self.pools.retain(|clue_type, _| keep(*clue_type));
    }

    pub fn pool_len(&self, clue_type: ClueType) -> usize {
        self.pools.get(&clue_type).map_or(0, |pool| pool.len())
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(|pool| pool.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clue> {
        self.pools.values().flatten()
    }

    /// Empties every pool, in clue-type order.
    pub fn drain(&mut self) -> Vec<Clue> {
        std::mem::take(&mut self.pools)
            .into_values()
            .flatten()
            .collect()
    }
}

struct UniverseGenerator<'a, R: Rng + ?Sized> {
    solution: &'a Solution,
    rng: &'a mut R,
    clues: BTreeMap<ClueType, Vec<Clue>>,
}

impl<'a, R: Rng + ?Sized> UniverseGenerator<'a, R> {
    fn n_positions(&self) -> usize {
        self.solution.shape.n_positions
    }

    fn n_categories(&self) -> usize {
        self.solution.shape.n_categories
    }

    fn at(&self, category: usize, position: usize) -> Item {
        self.solution.get(category, position)
    }

    fn random_category(&mut self) -> usize {
        let n_categories = self.n_categories();
        self.rng.random_range(0..n_categories)
    }

    fn distinct_categories(&mut self, amount: usize) -> Vec<usize> {
        let n_categories = self.n_categories();
        sample(self.rng, n_categories, amount).into_vec()
    }

    fn push(&mut self, clue: Clue) {
        debug_assert!(clue.is_true_of(self.solution), "{:?} is false", clue);
        let pool = self.clues.entry(clue.clue_type()).or_default();
        if !pool.contains(&clue) {
            pool.push(clue);
        }
    }

    fn generate_all(&mut self) {
        self.positional_and_conditional();
        self.direct_links();
        self.negative_links();
        self.relative_positions();
        self.opposites();
        self.triples();
        self.edges_and_parity();
        self.distances_and_sums();
        self.ordered_chains();
        self.neither_nor();
        self.compounds();
    }

    fn positional_and_conditional(&mut self) {
        for position in 0..self.n_positions() {
            let category = self.random_category();
            let item = self.at(category, position);
            self.push(Clue::Positional { position, item });

            let pair = self.distinct_categories(2);
            let clue = Clue::ConditionalLink(self.at(pair[0], position), self.at(pair[1], position));
            self.push(clue);
        }
    }

    fn direct_links(&mut self) {
        for position in 0..self.n_positions() {
            for (c1, c2) in (0..self.n_categories()).tuple_combinations() {
                let clue = Clue::DirectLink(self.at(c1, position), self.at(c2, position));
                self.push(clue);
            }
        }
    }

    fn negative_links(&mut self) {
        let n = self.n_positions();
        for (i, j) in (0..n).cartesian_product(0..n).filter(|(i, j)| i != j) {
            for (c1, c2) in (0..self.n_categories()).tuple_combinations() {
                let clue = Clue::NegativeDirectLink(self.at(c1, i), self.at(c2, j));
                self.push(clue);
            }
        }
    }

    fn relative_positions(&mut self) {
        let n = self.n_positions();
        let geometry = self.solution.shape.geometry;
        for position in 0..n {
            let Some(next) = geometry.next(position, n) else {
                continue;
            };
            let (c1, c2) = (self.random_category(), self.random_category());
            let clue = Clue::RelativePosition(self.at(c1, position), self.at(c2, next));
            self.push(clue);
        }
    }

    fn opposites(&mut self) {
        let n = self.n_positions();
        let geometry = self.solution.shape.geometry;
        for position in 0..n {
            let Some(opposite) = geometry.opposite(position, n) else {
                continue;
            };
            let (c1, c2) = (self.random_category(), self.random_category());
            let clue = Clue::OppositeLink(self.at(c1, position), self.at(c2, opposite));
            self.push(clue);
        }
    }

    /// Consecutive windows of three positions, one item per category.
    fn triples(&mut self) {
        let n = self.n_positions();
        if self.n_categories() < 3 || n < 3 {
            return;
        }
        for start in 0..n - 2 {
            let cats = self.distinct_categories(3);
            let (a, b, c) = (
                self.at(cats[0], start),
                self.at(cats[1], start + 1),
                self.at(cats[2], start + 2),
            );
            self.push(Clue::TransitiveSpatialLink(a, b, c));

            let cats = self.distinct_categories(3);
            let mut items = vec![
                self.at(cats[0], start),
                self.at(cats[1], start + 1),
                self.at(cats[2], start + 2),
            ];
            items.shuffle(self.rng);
            self.push(Clue::ThreeInARow(items[0], items[1], items[2]));
        }
    }

    fn edges_and_parity(&mut self) {
        let n = self.n_positions();
        if self.solution.shape.geometry.has_edges() {
            for category in 0..self.n_categories() {
                for position in [0, n - 1] {
                    let clue = Clue::AtEdge(self.at(category, position));
                    self.push(clue);
                }
            }
        }
        for item in self.solution.all_items() {
            let position = self.solution.position_of(item);
            self.push(Clue::IsEven {
                item,
                even: (position + 1) % 2 == 0,
            });
        }
    }

    fn distances_and_sums(&mut self) {
        let n = self.n_positions();
        for (i, j) in (0..n).tuple_combinations() {
            let (c1, c2) = (self.random_category(), self.random_category());
            let (a, b) = (self.at(c1, i), self.at(c2, j));
            self.push(Clue::SumEquals { a, b, sum: i + j + 2 });

            if j - i >= 2 {
                let (c1, c2) = (self.random_category(), self.random_category());
                let (a, b) = (self.at(c1, i), self.at(c2, j));
                self.push(Clue::DistanceGreaterThan {
                    a,
                    b,
                    distance: j - i - 1,
                });
            }
        }
    }

    fn ordered_chains(&mut self) {
        let n = self.n_positions();
        if n < 3 {
            return;
        }
        for _ in 0..n {
            let mut positions = sample(self.rng, n, 3).into_vec();
            positions.sort_unstable();
            let items: Vec<Item> = positions
                .into_iter()
                .map(|position| {
                    let category = self.random_category();
                    self.at(category, position)
                })
                .collect();
            self.push(Clue::OrderedChain(items[0], items[1], items[2]));
        }
    }

    fn neither_nor(&mut self) {
        let n = self.n_positions();
        for position in 0..n {
            let cats = self.distinct_categories(2);
            let mut items = [Item::new(0, 0); 2];
            for (slot, &category) in cats.iter().enumerate() {
                let elsewhere = (position + self.rng.random_range(1..n)) % n;
                items[slot] = self.at(category, elsewhere);
            }
            self.push(Clue::NeitherNorPosition { items, position });
        }
    }

    fn random_fact(&mut self, truth: bool) -> Fact {
        let n = self.n_positions();
        let position = self.rng.random_range(0..n);
        if self.rng.random_bool(0.5) {
            let category = self.random_category();
            let item = self.at(category, position);
            let position = if truth {
                position
            } else {
                (position + self.rng.random_range(1..n)) % n
            };
            Fact::At { item, position }
        } else {
            let cats = self.distinct_categories(2);
            let other = if truth {
                position
            } else {
                (position + self.rng.random_range(1..n)) % n
            };
            Fact::Together(self.at(cats[0], position), self.at(cats[1], other))
        }
    }

    fn compounds(&mut self) {
        for _ in 0..self.n_positions() * self.n_categories() {
            let (yes, no) = (self.random_fact(true), self.random_fact(false));
            let clue = if self.rng.random_bool(0.5) {
                Clue::EitherOr(yes, no)
            } else {
                Clue::EitherOr(no, yes)
            };
            self.push(clue);

            let truth = self.rng.random_bool(0.5);
            let (f, g) = (self.random_fact(truth), self.random_fact(truth));
            if f != g {
                self.push(Clue::IfAndOnlyIf(f, g));
            }

            let (antecedent, consequent) = match self.rng.random_range(0..3) {
                0 => (self.random_fact(true), self.random_fact(true)),
                1 => (self.random_fact(false), self.random_fact(true)),
                _ => (self.random_fact(false), self.random_fact(false)),
            };
            if antecedent != consequent {
                self.push(Clue::IfThen(antecedent, consequent));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use test_context::test_context;

    use super::*;
    use crate::{
        model::{Geometry, PuzzleShape},
        tests::UsingLogger,
    };

    fn universe_for(shape: PuzzleShape, seed: u64) -> (Solution, ClueUniverse) {
        let mut rng = StdRng::seed_from_u64(seed);
        let solution = Solution::generate(shape, &mut rng);
        let universe = ClueUniverse::generate(&solution, &mut rng);
        (solution, universe)
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_every_clue_is_true(_: &mut UsingLogger) {
        for (seed, geometry) in [(1, Geometry::Linear), (2, Geometry::Circular)] {
            let (solution, universe) = universe_for(PuzzleShape::new(4, 6, geometry), seed);
            assert!(!universe.is_empty());
            for clue in universe.iter() {
                assert!(clue.is_true_of(&solution), "{:?} is false", clue);
            }
        }
    }

    #[test]
    fn test_pool_sizes() {
        let (_, universe) = universe_for(PuzzleShape::new(3, 4, Geometry::Linear), 3);
        assert_eq!(universe.pool_len(ClueType::Positional), 4);
        assert_eq!(universe.pool_len(ClueType::ConditionalLink), 4);
        // 4 positions x 3 category pairs
        assert_eq!(universe.pool_len(ClueType::DirectLink), 12);
        // 12 ordered position pairs x 3 category pairs
        assert_eq!(universe.pool_len(ClueType::NegativeDirectLink), 36);
        assert_eq!(universe.pool_len(ClueType::RelativePosition), 3);
        assert_eq!(universe.pool_len(ClueType::TransitiveSpatialLink), 2);
        assert_eq!(universe.pool_len(ClueType::OppositeLink), 0);
        assert_eq!(universe.pool_len(ClueType::AtEdge), 6);
    }

    #[test]
    fn test_circular_geometry_wraps_and_opposes() {
        let (_, universe) = universe_for(PuzzleShape::new(3, 6, Geometry::Circular), 4);
        assert_eq!(universe.pool_len(ClueType::RelativePosition), 6);
        assert_eq!(universe.pool_len(ClueType::OppositeLink), 6);
        assert_eq!(universe.pool_len(ClueType::AtEdge), 0);
    }

    #[test]
    fn test_odd_circle_has_no_opposites() {
        for seed in 0..5 {
            let (_, universe) = universe_for(PuzzleShape::new(3, 5, Geometry::Circular), seed);
            assert_eq!(universe.pool_len(ClueType::OppositeLink), 0);
            assert!(universe
                .iter()
                .all(|clue| clue.clue_type() != ClueType::OppositeLink));
        }
    }

    #[test]
    fn test_two_categories_have_no_triples() {
        let (_, universe) = universe_for(PuzzleShape::new(2, 5, Geometry::Linear), 5);
        assert_eq!(universe.pool_len(ClueType::TransitiveSpatialLink), 0);
        assert_eq!(universe.pool_len(ClueType::ThreeInARow), 0);
    }

    #[test]
    fn test_draw_moves_clue_out() {
        let (_, mut universe) = universe_for(PuzzleShape::new(3, 4, Geometry::Linear), 6);
        let before = universe.len();
        let clue = universe.draw(ClueType::DirectLink).unwrap();
        assert_eq!(universe.len(), before - 1);
        assert!(!universe.iter().any(|candidate| candidate == &clue));
        assert!(!universe.remove(&clue));
    }

    #[test]
    fn test_remove_links_drops_giveaway() {
        let (solution, mut universe) = universe_for(PuzzleShape::new(3, 4, Geometry::Linear), 7);
        let subject = solution.get(0, 2);
        let answer = solution.get(2, 2);
        assert!(universe.remove_links(subject, answer) >= 1);
        assert!(!universe.iter().any(|clue| clue.states_link(subject, answer)));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let shape = PuzzleShape::new(4, 5, Geometry::Linear);
        let (_, mut a) = universe_for(shape, 42);
        let (_, mut b) = universe_for(shape, 42);
        assert_eq!(a.drain(), b.drain());
    }
}
