use crate::types::{CompareOp, ComparisonOptions, Literal, Shape};

/// Predicate text read back into a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    True,
    False,
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Compare(Compare),
}

/// A single `[quantifier] lhs op[options] rhs` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    pub quantifier: Quantifier,
    pub lhs: Operand,
    pub op: CompareOp,
    pub options: ComparisonOptions,
    pub rhs: Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Direct,
    /// `ANY` or `SOME`
    Any,
    All,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `SELF`
    Evaluated,
    Path(Vec<String>),
}

impl Operand {
    #[must_use]
    pub fn display_path(&self) -> String {
        match self {
            Operand::Evaluated => "SELF".to_owned(),
            Operand::Path(segments) => segments.join("."),
        }
    }
}

impl Expr {
    /// Top-level grouping, as a combinator sees it.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Expr::True => Shape::True,
            Expr::And(_) => Shape::And,
            Expr::Or(_) => Shape::Or,
            Expr::Not(_) => Shape::Not,
            Expr::False | Expr::Compare(_) => Shape::Atom,
        }
    }

    /// Call `visit` on every comparison in the tree, left to right.
    pub fn for_each_compare<'a>(&'a self, visit: &mut impl FnMut(&'a Compare)) {
        match self {
            Expr::True | Expr::False => {}
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.for_each_compare(visit);
                }
            }
            Expr::Not(inner) => inner.for_each_compare(visit),
            Expr::Compare(compare) => visit(compare),
        }
    }
}
