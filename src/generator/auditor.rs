use std::collections::VecDeque;

use log::{debug, info};
use rand::{seq::SliceRandom, Rng};

use crate::{
    error::AttemptFailure,
    model::{Clue, DifficultyProfile, Item, PuzzleShape, Question, Solution},
    solver::{Classification, ExactClassifier},
};

/// What the audit settled on for an accepted puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audit {
    pub question: Question,
    pub branches: usize,
}

/// Undirected graph over items and positions; two nodes are adjacent when
/// some clue mentions both.
pub struct InferenceGraph {
    n_items: usize,
    edges: Vec<Vec<usize>>,
}

impl InferenceGraph {
    pub fn new(shape: &PuzzleShape, clues: &[Clue]) -> Self {
        let n_items = shape.n_items();
        let mut edges = vec![vec![]; n_items + shape.n_positions];
        for clue in clues {
            let nodes: Vec<usize> = clue
                .items()
                .into_iter()
                .map(|item| shape.item_index(item))
                .chain(clue.positions().into_iter().map(|position| n_items + position))
                .collect();
            for (i, &a) in nodes.iter().enumerate() {
                for &b in &nodes[i + 1..] {
                    if a != b && !edges[a].contains(&b) {
                        edges[a].push(b);
                        edges[b].push(a);
                    }
                }
            }
        }
        Self { n_items, edges }
    }

    /// Length of the shortest path between two items, if they are connected.
    pub fn depth(&self, shape: &PuzzleShape, from: Item, to: Item) -> Option<usize> {
        let (start, goal) = (shape.item_index(from), shape.item_index(to));
        debug_assert!(start < self.n_items && goal < self.n_items);
        let mut distance = vec![None; self.edges.len()];
        distance[start] = Some(0);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            let d = distance[node]?;
            if node == goal {
                return Some(d);
            }
            for &next in &self.edges[node] {
                if distance[next].is_none() {
                    distance[next] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

pub struct QualityAuditor<'a> {
    classifier: &'a ExactClassifier,
}

impl<'a> QualityAuditor<'a> {
    pub fn new(classifier: &'a ExactClassifier) -> Self {
        Self { classifier }
    }

    pub fn audit<R: Rng + ?Sized>(
        &self,
        solution: &Solution,
        clues: &[Clue],
        profile: &DifficultyProfile,
        preferred: Question,
        rng: &mut R,
    ) -> Result<Audit, AttemptFailure> {
        let shape = &solution.shape;
        let report = self.classifier.classify_with_stats(shape, clues);
        if report.classification != Classification::One {
            return Err(AttemptFailure::Quality(format!(
                "minimized clues classify as {:?}",
                report.classification
            )));
        }
        if report.branches < profile.min_branches {
            return Err(AttemptFailure::Quality(format!(
                "solved with {} branches, need {}",
                report.branches, profile.min_branches
            )));
        }

        let question = self
            .select_question(solution, clues, profile, preferred, rng)
            .ok_or_else(|| AttemptFailure::Quality("no question is deep enough".to_string()))?;
        info!(
            target: "auditor",
            "Accepted puzzle: {} clues, {} branches, question {:?}",
            clues.len(),
            report.branches,
            question
        );
        Ok(Audit {
            question,
            branches: report.branches,
        })
    }

    /// Keeps `preferred` when it passes; otherwise the deepest valid question,
    /// ties going to whichever the shuffle puts last.
    pub fn select_question<R: Rng + ?Sized>(
        &self,
        solution: &Solution,
        clues: &[Clue],
        profile: &DifficultyProfile,
        preferred: Question,
        rng: &mut R,
    ) -> Option<Question> {
        let shape = &solution.shape;
        let graph = InferenceGraph::new(shape, clues);
        let depth_of = |question: &Question| -> Option<Option<usize>> {
            if clues
                .iter()
                .any(|clue| clue.states_link(question.subject, question.answer))
            {
                return None;
            }
            let depth = graph.depth(shape, question.subject, question.answer);
            let deep_enough = match depth {
                Some(d) => d >= profile.min_question_depth,
                None => profile.min_question_depth == 0,
            };
            deep_enough.then_some(depth)
        };

        if depth_of(&preferred).is_some() {
            return Some(preferred);
        }
        debug!(target: "auditor", "Preferred question {:?} rejected", preferred);

        let mut candidates: Vec<Question> = solution
            .all_items()
            .into_iter()
            .flat_map(|subject| {
                (0..shape.n_categories)
                    .filter(move |&category| category != subject.category)
                    .map(move |category| {
                        Question::new(subject, solution.get(category, solution.position_of(subject)))
                    })
            })
            .collect();
        candidates.shuffle(rng);

        candidates
            .into_iter()
            .filter_map(|question| depth_of(&question).map(|depth| (question, depth.unwrap_or(0))))
            .max_by_key(|(_, depth)| *depth)
            .map(|(question, _)| question)
    }
}
