//! `&`, `|` and `!` on predicate nodes.
//!
//! Each operator erases both sides and yields a [`Compound`]. Chains such as
//! `a & b & c` render flat (`a AND b AND c`).

use std::ops::{BitAnd, BitOr, Not as Negate};

use super::comparison::Comparison;
use super::compound::{Compound, LogicalOp};
use super::field::Field;
use super::logical::{And, Not, Or};
use super::predicate::{AnyPredicate, TypedPredicate};
use super::quantifier::{AnyMembers, NoMembers};
use super::schema::Schema;

macro_rules! combinators {
    ($([$($generics:tt)*] $node:ty;)+) => {
        $(
            impl<$($generics)*, R> BitAnd<R> for $node
            where
                R: TypedPredicate<Schema = <$node as TypedPredicate>::Schema>,
            {
                type Output = Compound<<$node as TypedPredicate>::Schema>;

                fn bitand(self, rhs: R) -> Self::Output {
                    Compound::new(LogicalOp::And, vec![self.erase(), rhs.erase()])
                }
            }

            impl<$($generics)*, R> BitOr<R> for $node
            where
                R: TypedPredicate<Schema = <$node as TypedPredicate>::Schema>,
            {
                type Output = Compound<<$node as TypedPredicate>::Schema>;

                fn bitor(self, rhs: R) -> Self::Output {
                    Compound::new(LogicalOp::Or, vec![self.erase(), rhs.erase()])
                }
            }

            impl<$($generics)*> Negate for $node {
                type Output = Compound<<$node as TypedPredicate>::Schema>;

                fn not(self) -> Self::Output {
                    Compound::new(LogicalOp::Not, vec![self.erase()])
                }
            }
        )+
    };
}

combinators! {
    [S: Schema] Field<S, bool>;
    [S: Schema] Comparison<S>;
    [S: Schema] Compound<S>;
    [S: Schema] AnyPredicate<S>;
    [S: Schema] And<S>;
    [S: Schema] Or<S>;
    [S: Schema] Not<S>;
    [S: Schema, E] AnyMembers<S, E>;
    [S: Schema, E] NoMembers<S, E>;
}
