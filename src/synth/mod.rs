pub mod top_down;

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::ast::Program;
use crate::expr::{ExprVal, Variable};
use crate::interp::{EvalError, Evaluator};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExampleError {
    #[error("expected `<bindings> -> <output>`, got `{0}`")]
    MissingArrow(String),
    #[error("bad binding `{0}`, expected `<var>=<int>`")]
    BadBinding(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("variable `{0}` bound twice")]
    Rebound(&'static str),
    #[error("variable `{0}` is not bound")]
    Unbound(&'static str),
    #[error("bad integer `{0}`")]
    BadInt(String),
}

/// One input/output pair. Every variable of the language is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub input: HashMap<Variable, ExprVal>,
    pub output: ExprVal,
}

impl Example {
    pub fn new(x: ExprVal, y: ExprVal, z: ExprVal, output: ExprVal) -> Self {
        Self {
            input: HashMap::from([
                (Variable::X, x),
                (Variable::Y, y),
                (Variable::Z, z),
            ]),
            output,
        }
    }

    pub fn get(&self, v: Variable) -> Option<ExprVal> {
        self.input.get(&v).copied()
    }

    /// Whether `prog` reproduces this example's output.
    pub fn accepts<E: Evaluator>(&self, eval: &E, prog: &Program) -> Result<bool, EvalError> {
        Ok(eval.evaluate(prog, &self.input)? == self.output)
    }
}

fn parse_int(s: &str) -> Result<ExprVal, ExampleError> {
    s.trim().parse().map_err(|_| ExampleError::BadInt(s.trim().to_string()))
}

/// Parses `x=1, y=0, z=0 -> 2`.
impl FromStr for Example {
    type Err = ExampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bindings, output) = s.split_once("->")
            .ok_or_else(|| ExampleError::MissingArrow(s.to_string()))?;
        let mut input = HashMap::new();

        for binding in bindings.split(',').map(str::trim).filter(|b| !b.is_empty()) {
            let (name, val) = binding.split_once('=')
                .ok_or_else(|| ExampleError::BadBinding(binding.to_string()))?;
            let var = name.trim().parse::<Variable>()
                .map_err(|_| ExampleError::UnknownVariable(name.trim().to_string()))?;

            if input.insert(var, parse_int(val)?).is_some() {
                return Err(ExampleError::Rebound(var.name()));
            }
        }

        if let Some(v) = Variable::ALL.into_iter().find(|v| !input.contains_key(v)) {
            return Err(ExampleError::Unbound(v.name()));
        }

        Ok(Self {
            input,
            output: parse_int(output)?,
        })
    }
}

/// Parses one example per line, skipping blank lines and `#` comments.
pub fn parse_examples(src: &str) -> Result<Vec<Example>, ExampleError> {
    src.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_example() {
        let ex: Example = "x=1, y=-2, z=3 -> 7".parse().unwrap();

        assert_eq!(ex, Example::new(1, -2, 3, 7));
        assert_eq!(ex.get(Variable::Y), Some(-2));
    }

    #[test]
    fn parse_example_errors() {
        assert_eq!(
            "x=1, y=2".parse::<Example>(),
            Err(ExampleError::MissingArrow("x=1, y=2".to_string())),
        );
        assert_eq!(
            "x=1, y=2 -> 3".parse::<Example>(),
            Err(ExampleError::Unbound("z")),
        );
        assert_eq!(
            "x=1, x=2, y=0, z=0 -> 3".parse::<Example>(),
            Err(ExampleError::Rebound("x")),
        );
        assert_eq!(
            "w=1, y=2, z=0 -> 3".parse::<Example>(),
            Err(ExampleError::UnknownVariable("w".to_string())),
        );
        assert_eq!(
            "x=one, y=2, z=0 -> 3".parse::<Example>(),
            Err(ExampleError::BadInt("one".to_string())),
        );
        assert_eq!(
            "x, y=2, z=0 -> 3".parse::<Example>(),
            Err(ExampleError::BadBinding("x".to_string())),
        );
    }

    #[test]
    fn accepts_reports_evaluator_errors() {
        use std::rc::Rc;

        use crate::ast::{AstNode, Bounds};
        use crate::expr::{Literal, Op, Symbol};
        use crate::interp::Interpreter;

        let bounds = Bounds::new(0, [0; 3]);
        let one = Rc::new(AstNode::leaf(Op::Lit(Literal::One), &bounds));
        let ex = Example::new(0, 0, 0, 1);

        let prog = Program::new(one.clone()).unwrap();
        assert_eq!(ex.accepts(&Interpreter, &prog), Ok(true));
        assert_eq!(Example::new(0, 0, 0, 2).accepts(&Interpreter, &prog), Ok(false));

        let lt = AstNode::new(Symbol::Terminal(Op::Lt), vec![one.clone(), one], &bounds);
        let prog = Program::new(Rc::new(lt)).unwrap();
        assert_eq!(
            ex.accepts(&Interpreter, &prog),
            Err(EvalError::Category("Lt", "numeric")),
        );
    }

    #[test]
    fn parse_example_list() {
        let src = "
            # identity
            x=0, y=0, z=0 -> 0

            x=4, y=0, z=0 -> 4
        ";

        let examples = parse_examples(src).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].output, 4);
    }
}
