use std::fmt;
use std::rc::Rc;

use crate::expr::{Category, ExprVal, Op, Symbol, Variable};
use crate::synth::Example;

/// Per-run parameters every node construction needs to derive its
/// reachable-value bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Largest output any example asks for (never below zero).
    pub target: ExprVal,
    /// Largest magnitude each variable takes over the examples, indexed
    /// by [`Variable::index`].
    pub vars: [ExprVal; 3],
}

impl Bounds {
    pub fn new(target: ExprVal, vars: [ExprVal; 3]) -> Self {
        Self { target, vars }
    }

    pub fn from_examples(examples: &[Example]) -> Self {
        let mut res = Self::new(0, [0; 3]);

        for example in examples {
            res.target = res.target.max(example.output);
            for v in Variable::ALL {
                let val = example.get(v).unwrap_or(0).saturating_abs();
                res.vars[v.index()] = res.vars[v.index()].max(val);
            }
        }

        res
    }

    pub fn var(&self, v: Variable) -> ExprVal {
        self.vars[v.index()]
    }
}

/// An immutable, possibly partial, program tree. All derived fields are
/// computed once in [`AstNode::new`]. Growing a tree produces a new root
/// that shares every untouched subtree with the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    symbol: Symbol,
    children: Vec<Rc<AstNode>>,
    cost: f64,
    complete: bool,
    bound: ExprVal,
}

impl AstNode {
    pub fn new(symbol: Symbol, children: Vec<Rc<AstNode>>, bounds: &Bounds) -> Self {
        // NOTE: a mismatch here is a bug in whoever builds the tree, the
        // grammar loader rejects such productions.
        match symbol {
            Symbol::Terminal(op) => assert_eq!(children.len(), op.arity(), "arity of {op:?}"),
            Symbol::NonTerminal(_) => assert!(children.is_empty(), "holes have no children"),
        }

        let cost = symbol.cost() + children.iter().map(|c| c.cost).sum::<f64>();
        let complete = symbol.is_terminal() && children.iter().all(|c| c.complete);
        let bound = Self::derive_bound(&symbol, &children, bounds);

        Self {
            symbol,
            children,
            cost,
            complete,
            bound,
        }
    }

    pub fn hole(category: Category, bounds: &Bounds) -> Self {
        Self::new(Symbol::NonTerminal(category), Vec::new(), bounds)
    }

    pub fn leaf(op: Op, bounds: &Bounds) -> Self {
        Self::new(Symbol::Terminal(op), Vec::new(), bounds)
    }

    fn derive_bound(symbol: &Symbol, children: &[Rc<AstNode>], bounds: &Bounds) -> ExprVal {
        let op = match symbol {
            Symbol::NonTerminal(_) => return bounds.target,
            Symbol::Terminal(op) => op,
        };

        match op {
            Op::Lit(l) => l.value(),
            Op::Var(v) => bounds.var(*v),
            Op::Add => children[0].bound.saturating_add(children[1].bound),
            Op::Multiply => children[0].bound.saturating_mul(children[1].bound),
            Op::Ite => children[1].bound.max(children[2].bound),
            Op::Lt | Op::Eq | Op::Not | Op::And | Op::Or => bounds.target,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn children(&self) -> &[Rc<AstNode>] {
        &self.children
    }

    pub fn child(&self, idx: usize) -> &AstNode {
        &self.children[idx]
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Upper bound on the magnitude of any value a completion of this
    /// subtree can evaluate to.
    pub fn bound(&self) -> ExprVal {
        self.bound
    }

    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }

    /// Path (child indices from the root) to the left-most pending hole
    /// in pre-order.
    pub fn first_hole(&self) -> Option<Vec<usize>> {
        let mut path = Vec::new();

        self.first_hole_rec(&mut path).then_some(path)
    }

    fn first_hole_rec(&self, path: &mut Vec<usize>) -> bool {
        if self.complete {
            return false;
        }
        if self.symbol.is_non_terminal() {
            return true;
        }

        for (idx, child) in self.children.iter().enumerate() {
            path.push(idx);
            if child.first_hole_rec(path) {
                return true;
            }
            path.pop();
        }

        false
    }

    pub fn at(&self, path: &[usize]) -> &AstNode {
        path.iter().fold(self, |node, idx| node.child(*idx))
    }

    /// Builds a new tree with the node at `path` replaced by `subtree`.
    /// Only the nodes along `path` are rebuilt, the rest are shared.
    /// Returns the new root along with the number of nodes rebuilt.
    pub fn substitute(&self, path: &[usize], subtree: AstNode, bounds: &Bounds) -> (AstNode, usize) {
        let Some((&idx, rest)) = path.split_first() else {
            return (subtree, 0);
        };

        let (new_child, rebuilt) = self.children[idx].substitute(rest, subtree, bounds);
        let mut children = self.children.clone();
        children[idx] = Rc::new(new_child);

        (AstNode::new(self.symbol, children, bounds), rebuilt + 1)
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)?;

        if self.children.is_empty() {
            return Ok(());
        }

        f.write_str("(")?;
        for (idx, child) in self.children.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

/// A complete tree accepted as the answer of a synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    root: Rc<AstNode>,
}

impl Program {
    /// Returns `None` when the tree still has holes.
    pub fn new(root: Rc<AstNode>) -> Option<Self> {
        root.is_complete().then_some(Self { root })
    }

    pub fn root(&self) -> &AstNode {
        &self.root
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
