use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{AstNode, Program};
use crate::expr::{Category, ExprVal, Op, Symbol, Variable};

pub type Bindings = HashMap<Variable, ExprVal>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("variable `{0}` is not bound")]
    Unbound(&'static str),
    #[error("cannot evaluate a hole of category `{0}`")]
    Hole(&'static str),
    #[error("`{0}` used where a {1} value was expected")]
    Category(&'static str, &'static str),
}

/// Runs a complete program against one set of variable bindings.
pub trait Evaluator {
    fn evaluate(&self, program: &Program, bindings: &Bindings) -> Result<ExprVal, EvalError>;
}

/// Direct tree-walking evaluator. Arithmetic wraps, so every complete
/// program of the grammar evaluates to something.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

fn kind_name(cat: Category) -> &'static str {
    match cat {
        Category::Expr => "numeric",
        Category::Bool => "boolean",
    }
}

impl Interpreter {
    fn op<'a>(node: &'a AstNode, want: Category) -> Result<&'a Op, EvalError> {
        match node.symbol() {
            Symbol::NonTerminal(cat) => Err(EvalError::Hole(cat.name())),
            Symbol::Terminal(op) if op.category() != want => {
                Err(EvalError::Category(op.name(), kind_name(want)))
            },
            Symbol::Terminal(op) => Ok(op),
        }
    }

    pub fn eval_num(&self, node: &AstNode, bindings: &Bindings) -> Result<ExprVal, EvalError> {
        let res = match Self::op(node, Category::Expr)? {
            Op::Var(v) => *bindings.get(v).ok_or(EvalError::Unbound(v.name()))?,
            Op::Lit(l) => l.value(),
            Op::Add => {
                let (l, r) = self.eval_pair(node, bindings)?;
                l.wrapping_add(r)
            },
            Op::Multiply => {
                let (l, r) = self.eval_pair(node, bindings)?;
                l.wrapping_mul(r)
            },
            Op::Ite => {
                if self.eval_bool(node.child(0), bindings)? {
                    self.eval_num(node.child(1), bindings)?
                } else {
                    self.eval_num(node.child(2), bindings)?
                }
            },
            // Filtered out by the category check above.
            Op::Lt | Op::Eq | Op::Not | Op::And | Op::Or => unreachable!(),
        };

        Ok(res)
    }

    pub fn eval_bool(&self, node: &AstNode, bindings: &Bindings) -> Result<bool, EvalError> {
        let res = match Self::op(node, Category::Bool)? {
            Op::Lt => {
                let (l, r) = self.eval_pair(node, bindings)?;
                l < r
            },
            Op::Eq => {
                let (l, r) = self.eval_pair(node, bindings)?;
                l == r
            },
            Op::Not => !self.eval_bool(node.child(0), bindings)?,
            Op::And => {
                self.eval_bool(node.child(0), bindings)?
                    && self.eval_bool(node.child(1), bindings)?
            },
            Op::Or => {
                self.eval_bool(node.child(0), bindings)?
                    || self.eval_bool(node.child(1), bindings)?
            },
            Op::Var(_) | Op::Lit(_) | Op::Ite | Op::Add | Op::Multiply => unreachable!(),
        };

        Ok(res)
    }

    fn eval_pair(&self, node: &AstNode, bindings: &Bindings) -> Result<(ExprVal, ExprVal), EvalError> {
        Ok((
            self.eval_num(node.child(0), bindings)?,
            self.eval_num(node.child(1), bindings)?,
        ))
    }
}

impl Evaluator for Interpreter {
    fn evaluate(&self, program: &Program, bindings: &Bindings) -> Result<ExprVal, EvalError> {
        self.eval_num(program.root(), bindings)
    }
}
