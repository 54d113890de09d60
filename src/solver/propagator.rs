use std::rc::Rc;

use log::trace;

use crate::model::{Clue, Item, PositionSet, PuzzleShape};

use super::clue_constraint::{create_clue_constraints, BinaryConstraint, ConstraintSet, NaryConstraint};

/// A work item that the propagator must process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkItem {
    /// Revise one side of a binary constraint against the other.
    /// `reversed == false` revises the first var against the second.
    Binary { index: usize, reversed: bool },
    Nary(usize),
    /// AllDifferent over the items of one category.
    Category(usize),
}

/// Some item ran out of possible positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction;

/// Constraints compiled from a clue list. Shared by every search node.
#[derive(Debug)]
struct ConstraintNetwork {
    shape: PuzzleShape,
    initial_domains: Vec<PositionSet>,
    binary: Vec<(usize, usize, Box<dyn BinaryConstraint>)>,
    nary: Vec<(Vec<usize>, Box<dyn NaryConstraint>)>,
    binary_by_var: Vec<Vec<usize>>,
    nary_by_var: Vec<Vec<usize>>,
}

impl ConstraintNetwork {
    fn compile(shape: &PuzzleShape, clues: &[Clue]) -> Self {
        let mut constraint_set = ConstraintSet::default();
        for clue in clues {
            constraint_set.extend(create_clue_constraints(clue, shape));
        }

        let n_vars = shape.n_items();
        let mut initial_domains = vec![PositionSet::full(shape.n_positions); n_vars];
        for constraint in &constraint_set.unary_constraints {
            let var = shape.item_index(constraint.var());
            initial_domains[var] = initial_domains[var]
                .iter()
                .filter(|&position| constraint.valid(position))
                .collect();
        }

        let mut binary = Vec::new();
        let mut binary_by_var = vec![Vec::new(); n_vars];
        for constraint in constraint_set.binary_constraints {
            let (a, b) = constraint.vars();
            let (x, y) = (shape.item_index(a), shape.item_index(b));
            if x == y {
                initial_domains[x] = initial_domains[x]
                    .iter()
                    .filter(|&position| constraint.valid(position, position))
                    .collect();
                continue;
            }
            binary_by_var[x].push(binary.len());
            binary_by_var[y].push(binary.len());
            binary.push((x, y, constraint));
        }

        let mut nary = Vec::new();
        let mut nary_by_var = vec![Vec::new(); n_vars];
        for constraint in constraint_set.nary_constraints {
            let vars: Vec<usize> = constraint
                .vars()
                .into_iter()
                .map(|item| shape.item_index(item))
                .collect();
            for &var in &vars {
                nary_by_var[var].push(nary.len());
            }
            nary.push((vars, constraint));
        }

        Self {
            shape: *shape,
            initial_domains,
            binary,
            nary,
            binary_by_var,
            nary_by_var,
        }
    }

    fn n_slots(&self) -> usize {
        self.binary.len() * 2 + self.nary.len() + self.shape.n_categories
    }

    fn slot(&self, item: WorkItem) -> usize {
        match item {
            WorkItem::Binary { index, reversed } => index * 2 + reversed as usize,
            WorkItem::Nary(index) => self.binary.len() * 2 + index,
            WorkItem::Category(category) => self.binary.len() * 2 + self.nary.len() + category,
        }
    }
}

/// Arc-consistency propagation over item positions, with AllDifferent per
/// category. Cheap to clone, so search can branch on copies.
#[derive(Debug, Clone)]
pub struct Propagator {
    network: Rc<ConstraintNetwork>,
    domains: Vec<PositionSet>,
    worklist: Vec<WorkItem>,
    queued: Vec<bool>,
}

impl Propagator {
    pub fn new(shape: &PuzzleShape, clues: &[Clue]) -> Self {
        let network = Rc::new(ConstraintNetwork::compile(shape, clues));
        let mut propagator = Self {
            domains: network.initial_domains.clone(),
            worklist: Vec::new(),
            queued: vec![false; network.n_slots()],
            network,
        };
        propagator.initialize_worklist();
        propagator
    }

    /// Everything is queued once; the worklist is popped from the back.
    fn initialize_worklist(&mut self) {
        let network = Rc::clone(&self.network);
        for index in 0..network.nary.len() {
            self.enqueue(WorkItem::Nary(index));
        }
        for index in 0..network.binary.len() {
            self.enqueue(WorkItem::Binary {
                index,
                reversed: false,
            });
            self.enqueue(WorkItem::Binary {
                index,
                reversed: true,
            });
        }
        for category in 0..network.shape.n_categories {
            self.enqueue(WorkItem::Category(category));
        }
    }

    pub fn shape(&self) -> &PuzzleShape {
        &self.network.shape
    }

    pub fn domains(&self) -> &[PositionSet] {
        &self.domains
    }

    pub fn domain(&self, item: Item) -> PositionSet {
        self.domains[self.network.shape.item_index(item)]
    }

    pub fn is_solved(&self) -> bool {
        self.domains.iter().all(|domain| domain.len() == 1)
    }

    /// The open variable with the fewest remaining positions.
    pub fn branch_variable(&self) -> Option<usize> {
        self.domains
            .iter()
            .enumerate()
            .filter(|(_, domain)| domain.len() > 1)
            .min_by_key(|(_, domain)| domain.len())
            .map(|(var, _)| var)
    }

    /// Fixes an item variable to one position. Call `propagate` afterwards.
    pub fn assign(&mut self, var: usize, position: usize) -> Result<(), Contradiction> {
        let narrowed = self.domains[var].intersection(PositionSet::single(position));
        self.set_domain(var, narrowed)
    }

    /// Runs the worklist until no domain changes.
    pub fn propagate(&mut self) -> Result<(), Contradiction> {
        if self.domains.iter().any(|domain| domain.is_empty()) {
            return Err(Contradiction);
        }
        while let Some(item) = self.worklist.pop() {
            let slot = self.network.slot(item);
            self.queued[slot] = false;
            let result = match item {
                WorkItem::Binary { index, reversed } => self.revise_binary(index, reversed),
                WorkItem::Nary(index) => self.revise_nary(index),
                WorkItem::Category(category) => self.revise_category(category),
            };
            if result.is_err() {
                self.worklist.clear();
                self.queued.iter_mut().for_each(|queued| *queued = false);
                return result;
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, item: WorkItem) {
        let slot = self.network.slot(item);
        if !self.queued[slot] {
            self.queued[slot] = true;
            self.worklist.push(item);
        }
    }

    fn set_domain(&mut self, var: usize, domain: PositionSet) -> Result<(), Contradiction> {
        if domain == self.domains[var] {
            return Ok(());
        }
        trace!(
            target: "propagator",
            "Narrowing {:?} from {:?} to {:?}",
            self.network.shape.item_at_index(var),
            self.domains[var],
            domain
        );
        self.domains[var] = domain;
        if domain.is_empty() {
            return Err(Contradiction);
        }
        self.enqueue_related_constraints(var);
        Ok(())
    }

    /// Enqueues every constraint that reads the given variable.
    fn enqueue_related_constraints(&mut self, var: usize) {
        let network = Rc::clone(&self.network);
        for &index in &network.binary_by_var[var] {
            let (x, _, _) = network.binary[index];
            // revise the other side against the changed one
            self.enqueue(WorkItem::Binary {
                index,
                reversed: x == var,
            });
        }
        for &index in &network.nary_by_var[var] {
            self.enqueue(WorkItem::Nary(index));
        }
        self.enqueue(WorkItem::Category(var / network.shape.n_positions));
    }

    /// For each position of one side, checks for support on the other side.
    fn revise_binary(&mut self, index: usize, reversed: bool) -> Result<(), Contradiction> {
        let network = Rc::clone(&self.network);
        let (a, b, constraint) = &network.binary[index];
        let (x, y) = if reversed { (*b, *a) } else { (*a, *b) };
        let domain_y = self.domains[y];
        let revised: PositionSet = self.domains[x]
            .iter()
            .filter(|&vx| {
                domain_y.iter().any(|vy| {
                    if reversed {
                        constraint.valid(vy, vx)
                    } else {
                        constraint.valid(vx, vy)
                    }
                })
            })
            .collect();
        self.set_domain(x, revised)
    }

    /// Keeps only the positions that appear in some satisfying tuple.
    fn revise_nary(&mut self, index: usize) -> Result<(), Contradiction> {
        let network = Rc::clone(&self.network);
        let (vars, constraint) = &network.nary[index];
        let domains: Vec<PositionSet> = vars.iter().map(|&var| self.domains[var]).collect();
        let mut supports = vec![PositionSet::EMPTY; vars.len()];
        let mut values = Vec::with_capacity(vars.len());
        collect_supports(constraint.as_ref(), &domains, &mut values, &mut supports);
        for (slot, &var) in vars.iter().enumerate() {
            let revised = self.domains[var].intersection(supports[slot]);
            self.set_domain(var, revised)?;
        }
        Ok(())
    }

    /// AllDifferent: a placed item leaves no room for others at its position,
    /// and a position only one item can take goes to that item.
    fn revise_category(&mut self, category: usize) -> Result<(), Contradiction> {
        let n = self.network.shape.n_positions;
        let vars = category * n..(category + 1) * n;
        loop {
            let mut changed = false;

            let mut placed = PositionSet::EMPTY;
            for var in vars.clone() {
                if let Some(position) = self.domains[var].single_value() {
                    if placed.contains(position) {
                        return Err(Contradiction);
                    }
                    placed.insert(position);
                }
            }
            for var in vars.clone() {
                if self.domains[var].len() > 1 {
                    let revised = self.domains[var].difference(placed);
                    if revised != self.domains[var] {
                        self.set_domain(var, revised)?;
                        changed = true;
                    }
                }
            }

            for position in 0..n {
                let mut holders = vars
                    .clone()
                    .filter(|&var| self.domains[var].contains(position));
                let first = holders.next().ok_or(Contradiction)?;
                if holders.next().is_none() && self.domains[first].len() > 1 {
                    self.set_domain(first, PositionSet::single(position))?;
                    changed = true;
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }
}

fn collect_supports(
    constraint: &dyn NaryConstraint,
    domains: &[PositionSet],
    values: &mut Vec<usize>,
    supports: &mut [PositionSet],
) {
    let depth = values.len();
    if depth == domains.len() {
        if constraint.valid(values) {
            for (slot, &value) in values.iter().enumerate() {
                supports[slot].insert(value);
            }
        }
        return;
    }
    for value in domains[depth].iter() {
        values.push(value);
        collect_supports(constraint, domains, values, supports);
        values.pop();
    }
}

#[cfg(test)]
mod tests {
    use test_context::test_context;

    use super::*;
    use crate::{model::Geometry, tests::UsingLogger};

    fn item(s: &str) -> Item {
        Item::parse(s)
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_link_follows_pin(_: &mut UsingLogger) {
        let shape = PuzzleShape::new(2, 4, Geometry::Linear);
        let clues = vec![
            Clue::Positional {
                position: 2,
                item: item("0a"),
            },
            Clue::DirectLink(item("0a"), item("1d")),
        ];
        let mut propagator = Propagator::new(&shape, &clues);
        assert_eq!(propagator.propagate(), Ok(()));
        assert_eq!(propagator.domain(item("1d")), PositionSet::single(2));
        // AllDifferent pushes the other items away from position 2
        assert!(!propagator.domain(item("0b")).contains(2));
        assert!(!propagator.domain(item("1a")).contains(2));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_hidden_single(_: &mut UsingLogger) {
        let shape = PuzzleShape::new(1, 3, Geometry::Linear);
        let clues = vec![
            Clue::NeitherNorPosition {
                items: [item("0a"), item("0b")],
                position: 1,
            },
        ];
        let mut propagator = Propagator::new(&shape, &clues);
        assert_eq!(propagator.propagate(), Ok(()));
        assert_eq!(propagator.domain(item("0c")), PositionSet::single(1));
        assert!(!propagator.is_solved());
    }

    #[test]
    fn test_two_pins_on_one_position_contradict() {
        let shape = PuzzleShape::new(2, 3, Geometry::Linear);
        let clues = vec![
            Clue::Positional {
                position: 0,
                item: item("1a"),
            },
            Clue::Positional {
                position: 0,
                item: item("1b"),
            },
        ];
        let mut propagator = Propagator::new(&shape, &clues);
        assert_eq!(propagator.propagate(), Err(Contradiction));
    }

    #[test]
    fn test_three_in_a_row_trims_far_positions() {
        let shape = PuzzleShape::new(3, 5, Geometry::Linear);
        let clues = vec![
            Clue::Positional {
                position: 0,
                item: item("0a"),
            },
            Clue::ThreeInARow(item("0a"), item("1a"), item("2a")),
        ];
        let mut propagator = Propagator::new(&shape, &clues);
        assert_eq!(propagator.propagate(), Ok(()));
        assert_eq!(propagator.domain(item("1a")), [1, 2].into_iter().collect::<PositionSet>());
        assert_eq!(propagator.domain(item("2a")), [1, 2].into_iter().collect::<PositionSet>());
    }

    #[test]
    fn test_assign_then_propagate_solves_chain() {
        let shape = PuzzleShape::new(2, 3, Geometry::Linear);
        let clues = vec![
            Clue::TransitiveSpatialLink(item("0a"), item("1b"), item("0c")),
            Clue::DirectLink(item("0a"), item("1c")),
        ];
        let mut propagator = Propagator::new(&shape, &clues);
        assert_eq!(propagator.propagate(), Ok(()));
        // 0a, 1b, 0c must fill positions 0, 1, 2 in order
        assert!(propagator.is_solved());
        assert_eq!(propagator.domain(item("0b")), PositionSet::single(1));
        assert_eq!(propagator.domain(item("1a")), PositionSet::single(2));
        assert_eq!(propagator.branch_variable(), None);
    }
}
