use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use log::trace;
use ordered_float::OrderedFloat;

use crate::ast::{AstNode, Bounds};
use crate::expr::Symbol;
use crate::grammar::{Grammar, Production};

/// Worklist entry. Cheaper trees come out first, equal costs come out in
/// the order they were discovered.
struct Queued {
    cost: OrderedFloat<f64>,
    seq: u64,
    tree: Rc<AstNode>,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so both keys are reversed.
        other.cost.cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Nodes constructed so far, holes and rebuilt path nodes included.
    pub nodes_built: usize,
    pub enqueued: usize,
    pub pruned: usize,
    pub popped: usize,
    pub expanded: usize,
}

/// What one call to [`TopDownEnum::expand`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expansion {
    pub kept: usize,
    pub pruned: usize,
}

/// Best-first enumerator over partial trees of a grammar.
///
/// Starting from a single hole of the start category, every expansion
/// fills the left-most hole of a tree with each alternative of its
/// category. Candidates whose root bound falls below the target are
/// dropped, since no completion of them can produce the largest output
/// the examples ask for.
pub struct TopDownEnum {
    grammar: Grammar,
    bounds: Bounds,
    worklist: BinaryHeap<Queued>,
    next_seq: u64,
    /// Discovery number of the tree `pop` handed out last.
    last_popped: Option<u64>,
    stats: Stats,
}

impl TopDownEnum {
    pub fn new(grammar: Grammar, bounds: Bounds) -> Self {
        let start = AstNode::hole(grammar.start(), &bounds);
        let mut res = Self {
            grammar,
            bounds,
            worklist: BinaryHeap::new(),
            next_seq: 0,
            last_popped: None,
            stats: Stats::default(),
        };

        res.stats.nodes_built += 1;
        res.push(start);

        res
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn queue_len(&self) -> usize {
        self.worklist.len()
    }

    /// Takes the cheapest tree off the worklist.
    pub fn pop(&mut self) -> Option<Rc<AstNode>> {
        let Queued { tree, seq, .. } = self.worklist.pop()?;
        self.stats.popped += 1;
        self.last_popped = Some(seq);

        Some(tree)
    }

    /// Puts back the tree the last [`pop`](Self::pop) returned, in the
    /// same place in line it had before.
    pub fn unpop(&mut self, tree: Rc<AstNode>) {
        // NOTE: unpopping without a matching pop is an API misuse
        let seq = self.last_popped.take().expect("unpop without pop");

        self.worklist.push(Queued {
            cost: OrderedFloat(tree.cost()),
            seq,
            tree,
        });
        self.stats.popped -= 1;
    }

    /// Replaces the first hole of `tree` with every alternative of its
    /// category and enqueues the candidates that survive pruning. A
    /// complete tree has nothing to expand.
    pub fn expand(&mut self, tree: &AstNode) -> Expansion {
        let mut res = Expansion::default();
        let Some(path) = tree.first_hole() else {
            return res;
        };
        let category = tree.at(&path).symbol().category();

        self.stats.expanded += 1;

        // The grammar is only borrowed for the loop, candidates are
        // collected first so `push` can take `&mut self`.
        let candidates = self.grammar.alternatives(category)
            .iter()
            .map(|prod| Self::fill(tree, &path, prod, &self.bounds))
            .collect::<Vec<_>>();

        for (cand, built) in candidates {
            self.stats.nodes_built += built;

            if cand.bound() < self.bounds.target {
                trace!("Prune: {cand} (bound {})", cand.bound());
                self.stats.pruned += 1;
                res.pruned += 1;
                continue;
            }

            trace!("Enqueue: {cand} (cost {:.1})", cand.cost());
            self.push(cand);
            res.kept += 1;
        }

        res
    }

    /// Builds `tree` with the hole at `path` replaced by `prod` applied to
    /// fresh holes. Also returns how many nodes that took.
    fn fill(tree: &AstNode, path: &[usize], prod: &Production, bounds: &Bounds) -> (AstNode, usize) {
        let holes = prod.children.iter()
            .map(|cat| Rc::new(AstNode::hole(*cat, bounds)))
            .collect::<Vec<_>>();
        let subtree = AstNode::new(Symbol::Terminal(prod.op), holes, bounds);
        let (root, rebuilt) = tree.substitute(path, subtree, bounds);

        (root, 1 + prod.children.len() + rebuilt)
    }

    fn push(&mut self, tree: AstNode) {
        self.worklist.push(Queued {
            cost: OrderedFloat(tree.cost()),
            seq: self.next_seq,
            tree: Rc::new(tree),
        });
        self.next_seq += 1;
        self.stats.enqueued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Category, Literal, Op, Variable};

    fn names(trees: &[Rc<AstNode>]) -> Vec<String> {
        trees.iter().map(|t| t.to_string()).collect()
    }

    fn drain(synth: &mut TopDownEnum) -> Vec<Rc<AstNode>> {
        std::iter::from_fn(|| synth.pop()).collect()
    }

    #[test]
    fn starts_with_a_single_hole() {
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), Bounds::new(0, [0; 3]));

        assert_eq!(synth.queue_len(), 1);
        let root = synth.pop().unwrap();
        assert_eq!(root.symbol(), &Symbol::NonTerminal(Category::Expr));
        assert!(synth.pop().is_none());
    }

    #[test]
    fn expansion_order_is_cost_then_discovery() {
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), Bounds::new(0, [0; 3]));
        let root = synth.pop().unwrap();

        let exp = synth.expand(&root);
        assert_eq!(exp, Expansion { kept: 9, pruned: 0 });

        assert_eq!(names(&drain(&mut synth)), vec![
            "x", "y", "z", "1", "2", "3",
            "Add(E, E)", "Multiply(E, E)", "Ite(B, E, E)",
        ]);
    }

    #[test]
    fn prunes_candidates_below_target() {
        // Need 5, x reaches at most 5, y and z stay at 0.
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), Bounds::new(5, [5, 0, 0]));
        let root = synth.pop().unwrap();

        let exp = synth.expand(&root);
        assert_eq!(exp, Expansion { kept: 4, pruned: 5 });
        assert_eq!(synth.stats().pruned, 5);

        let kept = drain(&mut synth);
        assert_eq!(names(&kept), vec!["x", "Add(E, E)", "Multiply(E, E)", "Ite(B, E, E)"]);
        assert!(kept.iter().all(|t| t.bound() >= 5));
    }

    #[test]
    fn fills_only_the_first_hole() {
        let bounds = Bounds::new(0, [0; 3]);
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), bounds);
        synth.pop();

        let tree = AstNode::new(
            Symbol::Terminal(Op::Ite),
            vec![
                Rc::new(AstNode::hole(Category::Bool, &bounds)),
                Rc::new(AstNode::hole(Category::Expr, &bounds)),
                Rc::new(AstNode::leaf(Op::Var(Variable::X), &bounds)),
            ],
            &bounds,
        );
        synth.expand(&tree);

        let grown = drain(&mut synth);
        assert_eq!(names(&grown), vec![
            "Ite(Not(B), E, x)",
            "Ite(Lt(E, E), E, x)",
            "Ite(Eq(E, E), E, x)",
            "Ite(And(B, B), E, x)",
            "Ite(Or(B, B), E, x)",
        ]);
        // The untouched leaf is shared, not copied.
        assert!(grown.iter().all(|t| Rc::ptr_eq(&t.children()[2], &tree.children()[2])));
    }

    #[test]
    fn complete_trees_do_not_expand() {
        let bounds = Bounds::new(0, [0; 3]);
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), bounds);
        synth.pop();

        let exp = synth.expand(&AstNode::leaf(Op::Lit(Literal::One), &bounds));
        assert_eq!(exp, Expansion::default());
        assert_eq!(synth.queue_len(), 0);
        assert_eq!(synth.stats().expanded, 0);
    }

    #[test]
    fn cost_never_decreases_along_pops() {
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), Bounds::new(3, [1, 1, 1]));
        let mut last = 0.0;

        for _ in 0..2_000 {
            let Some(tree) = synth.pop() else { break };
            assert!(tree.cost() >= last);
            last = tree.cost();
            synth.expand(&tree);
        }
    }

    #[test]
    fn unpop_restores_the_order() {
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), Bounds::new(0, [0; 3]));
        let root = synth.pop().unwrap();
        synth.expand(&root);

        let x = synth.pop().unwrap();
        assert_eq!(x.to_string(), "x");
        synth.unpop(x);

        assert_eq!(synth.stats().popped, 1);
        assert_eq!(names(&drain(&mut synth)), vec![
            "x", "y", "z", "1", "2", "3",
            "Add(E, E)", "Multiply(E, E)", "Ite(B, E, E)",
        ]);
    }

    #[test]
    fn counts_built_nodes() {
        let mut synth = TopDownEnum::new(Grammar::arithmetic(), Bounds::new(0, [0; 3]));
        let root = synth.pop().unwrap();
        synth.expand(&root);

        // The start hole, six leaves, Add and Multiply with two holes
        // each, Ite with three.
        assert_eq!(synth.stats().nodes_built, 1 + 6 + 3 + 3 + 4);
        assert_eq!(synth.stats().enqueued, 10);
    }
}
