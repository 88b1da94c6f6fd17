//! The production rules the enumerator expands holes with.
//!
//! A grammar has exactly two categories, numeric (`E`) and boolean (`B`),
//! each with an ordered list of alternatives. The order of the
//! alternatives is the order candidates are generated in, so it is part of
//! what makes a run reproducible.

use thiserror::Error;

use crate::expr::{Category, Literal, Op};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar has no rules")]
    Empty,
    #[error("line {0}: expected `<category> -> <alternatives>`")]
    MissingArrow(usize),
    #[error("line {0}: unknown category `{1}`")]
    UnknownCategory(usize, String),
    #[error("line {0}: unknown operator `{1}`")]
    UnknownOperator(usize, String),
    #[error("line {0}: malformed alternative `{1}`")]
    Malformed(usize, String),
    #[error("line {line}: `{op}` produces a {produces} value, not {category}")]
    WrongCategory {
        line: usize,
        op: &'static str,
        produces: &'static str,
        category: &'static str,
    },
    #[error("line {0}: `{1}` does not take the listed children")]
    WrongChildren(usize, &'static str),
    #[error("category `{0}` defined twice")]
    Redefined(&'static str),
    #[error("category `{0}` is used but has no alternatives")]
    Undefined(&'static str),
    #[error("programs are numeric, the first rule must define `E`, not `{0}`")]
    NonNumericStart(&'static str),
}

/// One alternative: an operator plus the categories of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub op: Op,
    pub children: Vec<Category>,
}

impl Production {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            children: op.signature().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start: Category,
    numeric: Vec<Production>,
    boolean: Vec<Production>,
}

impl Grammar {
    /// The integer-arithmetic grammar with conditionals.
    pub fn arithmetic() -> Self {
        use crate::expr::Variable;

        let numeric = [
            Op::Var(Variable::X),
            Op::Var(Variable::Y),
            Op::Var(Variable::Z),
            Op::Lit(Literal::One),
            Op::Lit(Literal::Two),
            Op::Lit(Literal::Three),
            Op::Ite,
            Op::Add,
            Op::Multiply,
        ];
        let boolean = [Op::Lt, Op::Eq, Op::Not, Op::And, Op::Or];

        Self {
            start: Category::Expr,
            numeric: numeric.into_iter().map(Production::new).collect(),
            boolean: boolean.into_iter().map(Production::new).collect(),
        }
    }

    pub fn start(&self) -> Category {
        self.start
    }

    pub fn alternatives(&self, cat: Category) -> &[Production] {
        match cat {
            Category::Expr => &self.numeric,
            Category::Bool => &self.boolean,
        }
    }

    /// Loads rules of the form `E -> x | 1 | Add(E, E)`, one per line.
    /// The first rule names the start category, which has to be `E`.
    pub fn parse(src: &str) -> Result<Self, GrammarError> {
        let mut start = None;
        let mut numeric = None;
        let mut boolean = None;

        for (idx, line) in src.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let (lhs, rhs) = line.split_once("->").ok_or(GrammarError::MissingArrow(line_no))?;
            let lhs = lhs.trim();
            let cat = lhs.parse::<Category>()
                .map_err(|_| GrammarError::UnknownCategory(line_no, lhs.to_string()))?;
            let prods = rhs.split('|')
                .map(|alt| Self::parse_alternative(line_no, cat, alt.trim()))
                .collect::<Result<Vec<_>, _>>()?;

            let slot = match cat {
                Category::Expr => &mut numeric,
                Category::Bool => &mut boolean,
            };
            if slot.replace(prods).is_some() {
                return Err(GrammarError::Redefined(cat.name()));
            }
            start.get_or_insert(cat);
        }

        let start = start.ok_or(GrammarError::Empty)?;
        if start != Category::Expr {
            return Err(GrammarError::NonNumericStart(start.name()));
        }
        let res = Self {
            start,
            numeric: numeric.unwrap_or_default(),
            boolean: boolean.unwrap_or_default(),
        };
        res.check_reachable()?;

        Ok(res)
    }

    fn parse_alternative(line: usize, cat: Category, alt: &str) -> Result<Production, GrammarError> {
        let malformed = || GrammarError::Malformed(line, alt.to_string());

        let (name, children) = match alt.split_once('(') {
            None => (alt, Vec::new()),
            Some((name, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(malformed)?;
                let children = inner.split(',')
                    .map(str::trim)
                    .map(|c| c.parse::<Category>()
                        .map_err(|_| GrammarError::UnknownCategory(line, c.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;

                (name.trim(), children)
            },
        };
        if name.is_empty() {
            return Err(malformed());
        }

        let op = name.parse::<Op>()
            .map_err(|_| GrammarError::UnknownOperator(line, name.to_string()))?;
        if op.category() != cat {
            return Err(GrammarError::WrongCategory {
                line,
                op: op.name(),
                produces: op.category().name(),
                category: cat.name(),
            });
        }
        if children != op.signature() {
            return Err(GrammarError::WrongChildren(line, op.name()));
        }

        Ok(Production { op, children })
    }

    /// Every category a hole can be created for must have alternatives.
    fn check_reachable(&self) -> Result<(), GrammarError> {
        let used = std::iter::once(self.start)
            .chain(self.numeric.iter().chain(&self.boolean).flat_map(|p| p.children.iter().copied()));

        for cat in used {
            if self.alternatives(cat).is_empty() {
                return Err(GrammarError::Undefined(cat.name()));
            }
        }

        Ok(())
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::arithmetic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Variable;

    const ARITHMETIC: &str = "
        # numeric expressions come first, so they are the start category
        E -> x | y | z | 1 | 2 | 3 | Ite(B, E, E) | Add(E, E) | Multiply(E, E)
        B -> Lt(E, E) | Eq(E, E) | Not(B) | And(B, B) | Or(B, B)
    ";

    #[test]
    fn parsed_matches_builtin() {
        assert_eq!(Grammar::parse(ARITHMETIC).unwrap(), Grammar::arithmetic());
    }

    #[test]
    fn alternatives_keep_order() {
        let g = Grammar::parse("E -> Add(E, E) | z | 2").unwrap();
        let ops = g.alternatives(Category::Expr).iter().map(|p| p.op).collect::<Vec<_>>();

        assert_eq!(g.start(), Category::Expr);
        assert_eq!(ops, vec![Op::Add, Op::Var(Variable::Z), Op::Lit(Literal::Two)]);
        assert!(g.alternatives(Category::Bool).is_empty());
    }

    #[test]
    fn rejects_bad_grammars() {
        assert_eq!(Grammar::parse("  \n# nothing\n"), Err(GrammarError::Empty));
        assert_eq!(Grammar::parse("E x | y"), Err(GrammarError::MissingArrow(1)));
        assert_eq!(
            Grammar::parse("S -> x"),
            Err(GrammarError::UnknownCategory(1, "S".to_string())),
        );
        assert_eq!(
            Grammar::parse("E -> x | Sub(E, E)"),
            Err(GrammarError::UnknownOperator(1, "Sub".to_string())),
        );
        assert_eq!(
            Grammar::parse("E -> x | Add(E)"),
            Err(GrammarError::WrongChildren(1, "Add")),
        );
        assert_eq!(
            Grammar::parse("E -> Add(E, E"),
            Err(GrammarError::Malformed(1, "Add(E, E".to_string())),
        );
        assert!(matches!(
            Grammar::parse("E -> Lt(E, E)"),
            Err(GrammarError::WrongCategory { op: "Lt", .. }),
        ));
        assert_eq!(
            Grammar::parse("E -> x\nE -> y"),
            Err(GrammarError::Redefined("E")),
        );
        assert_eq!(
            Grammar::parse("E -> x | Ite(B, E, E)"),
            Err(GrammarError::Undefined("B")),
        );
        assert_eq!(
            Grammar::parse("B -> Lt(E, E) | Not(B)\nE -> x | 1"),
            Err(GrammarError::NonNumericStart("B")),
        );
    }
}
