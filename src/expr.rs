use std::fmt;
use std::str::FromStr;

use crate::cost;

pub type ExprVal = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    X,
    Y,
    Z,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::X, Variable::Y, Variable::Z];

    pub fn name(self) -> &'static str {
        match self {
            Variable::X => "x",
            Variable::Y => "y",
            Variable::Z => "z",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Variable::X => 0,
            Variable::Y => 1,
            Variable::Z => 2,
        }
    }
}

impl FromStr for Variable {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Variable::X),
            "y" => Ok(Variable::Y),
            "z" => Ok(Variable::Z),
            _ => Err(()),
        }
    }
}

/// Syntactic category of a grammar hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Numeric expressions.
    Expr,
    /// Boolean expressions.
    Bool,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Expr => "E",
            Category::Bool => "B",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E" => Ok(Category::Expr),
            "B" => Ok(Category::Bool),
            _ => Err(()),
        }
    }
}

/// The integer literals of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
    One,
    Two,
    Three,
}

impl Literal {
    pub const ALL: [Literal; 3] = [Literal::One, Literal::Two, Literal::Three];

    pub fn value(self) -> ExprVal {
        match self {
            Literal::One => 1,
            Literal::Two => 2,
            Literal::Three => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Literal::One => "1",
            Literal::Two => "2",
            Literal::Three => "3",
        }
    }
}

impl FromStr for Literal {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Literal::ALL.into_iter().find(|l| l.name() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Var(Variable),
    Lit(Literal),
    Ite,
    Add,
    Multiply,
    Lt,
    Eq,
    Not,
    And,
    Or,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Var(v) => v.name(),
            Op::Lit(l) => l.name(),
            Op::Ite => "Ite",
            Op::Add => "Add",
            Op::Multiply => "Multiply",
            Op::Lt => "Lt",
            Op::Eq => "Eq",
            Op::Not => "Not",
            Op::And => "And",
            Op::Or => "Or",
        }
    }

    /// Category of the value this operator produces.
    pub fn category(self) -> Category {
        match self {
            Op::Var(_) | Op::Lit(_) | Op::Ite | Op::Add | Op::Multiply => Category::Expr,
            Op::Lt | Op::Eq | Op::Not | Op::And | Op::Or => Category::Bool,
        }
    }

    /// Child categories the evaluator expects, in order.
    pub fn signature(self) -> &'static [Category] {
        use Category::{Bool, Expr};

        match self {
            Op::Var(_) | Op::Lit(_) => &[],
            Op::Ite => &[Bool, Expr, Expr],
            Op::Add | Op::Multiply | Op::Lt | Op::Eq => &[Expr, Expr],
            Op::Not => &[Bool],
            Op::And | Op::Or => &[Bool, Bool],
        }
    }

    pub fn arity(self) -> usize {
        self.signature().len()
    }
}

impl FromStr for Op {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<Variable>() {
            return Ok(Op::Var(v));
        }
        if let Ok(l) = s.parse::<Literal>() {
            return Ok(Op::Lit(l));
        }

        let op = match s {
            "Ite" => Op::Ite,
            "Add" => Op::Add,
            "Multiply" => Op::Multiply,
            "Lt" => Op::Lt,
            "Eq" => Op::Eq,
            "Not" => Op::Not,
            "And" => Op::And,
            "Or" => Op::Or,
            _ => return Err(()),
        };

        Ok(op)
    }
}

/// A grammar symbol. Terminals are the operators that end up in a
/// program, non-terminals are the holes still waiting for expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Op),
    NonTerminal(Category),
}

impl Symbol {
    pub fn name(&self) -> &'static str {
        match self {
            Symbol::Terminal(op) => op.name(),
            Symbol::NonTerminal(cat) => cat.name(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        !self.is_terminal()
    }

    pub fn cost(&self) -> f64 {
        cost::weight(self.name())
    }

    pub fn category(&self) -> Category {
        match self {
            Symbol::Terminal(op) => op.category(),
            Symbol::NonTerminal(cat) => *cat,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_names_round_trip() {
        let names = [
            "x", "y", "z", "1", "2", "3",
            "Ite", "Add", "Multiply", "Lt", "Eq", "Not", "And", "Or",
        ];

        for name in names {
            let op: Op = name.parse().unwrap();
            assert_eq!(op.name(), name);
        }

        assert!("Sub".parse::<Op>().is_err());
        assert!("4".parse::<Op>().is_err());
    }

    #[test]
    fn only_three_literals() {
        let values = Literal::ALL.map(Literal::value);
        assert_eq!(values, [1, 2, 3]);

        assert_eq!("2".parse::<Op>(), Ok(Op::Lit(Literal::Two)));
        assert!("?".parse::<Op>().is_err());
        assert!("0".parse::<Literal>().is_err());
    }

    #[test]
    fn symbol_predicates_are_complementary() {
        let t = Symbol::Terminal(Op::Add);
        let nt = Symbol::NonTerminal(Category::Bool);

        assert!(t.is_terminal() && !t.is_non_terminal());
        assert!(nt.is_non_terminal() && !nt.is_terminal());
        assert_eq!(nt.name(), "B");
        assert_eq!(nt.cost(), 0.0);
    }

    #[test]
    fn categories_match_signatures() {
        assert_eq!(Op::Ite.category(), Category::Expr);
        assert_eq!(Op::Not.category(), Category::Bool);
        assert_eq!(Op::Ite.arity(), 3);
        assert_eq!(Op::Var(Variable::Z).arity(), 0);
    }
}
