use std::fmt;

use super::predicate::{AnyPredicate, Shape, TypedPredicate};
use super::schema::Schema;

/// Logical operators joining erased members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A logical operator over an ordered list of erased predicates.
///
/// Rendering:
/// - AND drops `TRUEPREDICATE` members when other members remain. An empty
///   AND is `TRUEPREDICATE`.
/// - An empty OR is `FALSEPREDICATE`.
/// - A single-member AND or OR renders as that member.
/// - Members are joined with ` AND ` / ` OR `. A member is parenthesized
///   when it is a NOT or a compound of the other operator.
/// - NOT folds its members with AND and renders `NOT <subject>`, with the
///   subject parenthesized when it is compound.
pub struct Compound<S> {
    op: LogicalOp,
    members: Vec<AnyPredicate<S>>,
}

impl<S> Compound<S> {
    #[must_use]
    pub fn new(op: LogicalOp, members: Vec<AnyPredicate<S>>) -> Self {
        Self { op, members }
    }

    #[must_use]
    pub fn op(&self) -> LogicalOp {
        self.op
    }

    #[must_use]
    pub fn members(&self) -> &[AnyPredicate<S>] {
        &self.members
    }

    #[must_use]
    pub fn into_members(self) -> Vec<AnyPredicate<S>> {
        self.members
    }

    pub(crate) fn fold(&self) -> AnyPredicate<S> {
        fold(self.op, &self.members)
    }
}

pub(crate) fn fold<S>(op: LogicalOp, members: &[AnyPredicate<S>]) -> AnyPredicate<S> {
    match op {
        LogicalOp::And => {
            let kept: Vec<&AnyPredicate<S>> = members.iter().filter(|m| !m.is_always()).collect();
            join(LogicalOp::And, &kept).unwrap_or_else(AnyPredicate::always)
        }
        LogicalOp::Or => {
            let all: Vec<&AnyPredicate<S>> = members.iter().collect();
            join(LogicalOp::Or, &all).unwrap_or_else(AnyPredicate::never)
        }
        LogicalOp::Not => {
            let subject = fold(LogicalOp::And, members);
            let format = if matches!(subject.shape(), Shape::And | Shape::Or | Shape::Not) {
                format!("NOT ({subject})")
            } else {
                format!("NOT {subject}")
            };
            AnyPredicate::from_parts(format, Shape::Not)
        }
    }
}

/// Join 2+ members, or pass a single member through. `None` when empty.
fn join<S>(op: LogicalOp, members: &[&AnyPredicate<S>]) -> Option<AnyPredicate<S>> {
    match members {
        [] => None,
        [single] => Some((*single).clone()),
        _ => {
            let separator = format!(" {op} ");
            let format = members
                .iter()
                .map(|member| {
                    if needs_parens(op, member.shape()) {
                        format!("({member})")
                    } else {
                        member.format().to_owned()
                    }
                })
                .collect::<Vec<_>>()
                .join(&separator);
            let shape = match op {
                LogicalOp::Or => Shape::Or,
                _ => Shape::And,
            };
            Some(AnyPredicate::from_parts(format, shape))
        }
    }
}

fn needs_parens(parent: LogicalOp, member: Shape) -> bool {
    match member {
        Shape::Atom | Shape::True => false,
        Shape::Not => true,
        Shape::And => parent != LogicalOp::And,
        Shape::Or => parent != LogicalOp::Or,
    }
}

impl<S> Clone for Compound<S> {
    fn clone(&self) -> Self {
        Self::new(self.op, self.members.clone())
    }
}

impl<S> fmt::Debug for Compound<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compound")
            .field("op", &self.op)
            .field("members", &self.members)
            .finish()
    }
}

impl<S> fmt::Display for Compound<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fold().format())
    }
}

impl<S: Schema> TypedPredicate for Compound<S> {
    type Schema = S;

    fn erase(&self) -> AnyPredicate<S> {
        self.fold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ship;

    fn atom(text: &str) -> AnyPredicate<Ship> {
        AnyPredicate::from_parts(text.to_owned(), Shape::Atom)
    }

    fn render(op: LogicalOp, members: Vec<AnyPredicate<Ship>>) -> String {
        Compound::new(op, members).to_string()
    }

    #[test]
    fn empty_compounds() {
        assert_eq!(render(LogicalOp::And, vec![]), "TRUEPREDICATE");
        assert_eq!(render(LogicalOp::Or, vec![]), "FALSEPREDICATE");
        assert_eq!(render(LogicalOp::Not, vec![]), "NOT TRUEPREDICATE");
    }

    #[test]
    fn single_member_is_transparent() {
        assert_eq!(render(LogicalOp::And, vec![atom("isReal == 1")]), "isReal == 1");
        assert_eq!(render(LogicalOp::Or, vec![atom("isReal == 1")]), "isReal == 1");
    }

    #[test]
    fn true_is_the_identity_of_and() {
        let members = vec![
            AnyPredicate::always(),
            atom("cost > 0"),
            AnyPredicate::always(),
            atom("cost > 1"),
        ];
        assert_eq!(render(LogicalOp::And, members), "cost > 0 AND cost > 1");
        let only_true = vec![AnyPredicate::always(), AnyPredicate::always()];
        assert_eq!(render(LogicalOp::And, only_true), "TRUEPREDICATE");
    }

    #[test]
    fn nested_same_operator_is_flat() {
        let inner = Compound::new(LogicalOp::And, vec![atom("a == 1"), atom("b == 2")]).fold();
        let outer = render(LogicalOp::And, vec![inner, atom("c == 3")]);
        assert_eq!(outer, "a == 1 AND b == 2 AND c == 3");
    }

    #[test]
    fn nested_other_operator_is_parenthesized() {
        let or = Compound::new(LogicalOp::Or, vec![atom("a == 1"), atom("b == 2")]).fold();
        let and = render(LogicalOp::And, vec![atom("c == 3"), or]);
        assert_eq!(and, "c == 3 AND (a == 1 OR b == 2)");

        let and = Compound::new(LogicalOp::And, vec![atom("a == 1"), atom("b == 2")]).fold();
        let or = render(LogicalOp::Or, vec![and, atom("c == 3")]);
        assert_eq!(or, "(a == 1 AND b == 2) OR c == 3");
    }

    #[test]
    fn not_members_are_parenthesized() {
        let not = Compound::new(LogicalOp::Not, vec![atom("a == 1")]).fold();
        assert_eq!(not.format(), "NOT a == 1");
        assert_eq!(
            render(LogicalOp::And, vec![not.clone(), atom("b == 2")]),
            "(NOT a == 1) AND b == 2"
        );
        assert_eq!(render(LogicalOp::Not, vec![not]), "NOT (NOT a == 1)");
    }

    #[test]
    fn not_folds_members_with_and() {
        assert_eq!(
            render(LogicalOp::Not, vec![atom("a == 1"), atom("b == 2")]),
            "NOT (a == 1 AND b == 2)"
        );
    }
}
