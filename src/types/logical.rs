use std::fmt;

use crate::block::Block;

use super::compound::{Compound, LogicalOp};
use super::predicate::{AnyPredicate, TypedPredicate};
use super::schema::Schema;

macro_rules! logical {
    ($(#[$meta:meta])* $name:ident => $op:expr) => {
        $(#[$meta])*
        pub struct $name<S>(Compound<S>);

        impl<S: Schema> $name<S> {
            /// Combine the list form of a finished block.
            #[must_use]
            pub fn new(block: Block<S>) -> Self {
                Self::from_members(block.into_list())
            }

            /// Fill a fresh block and combine its members.
            #[must_use]
            pub fn build(steps: impl FnOnce(&mut Block<S>)) -> Self {
                let mut block = Block::new();
                steps(&mut block);
                Self::new(block)
            }

            /// Wrap one pre-built predicate.
            #[must_use]
            pub fn single(predicate: impl TypedPredicate<Schema = S>) -> Self {
                Self::from_members(vec![predicate.erase()])
            }
        }

        impl<S> $name<S> {
            #[must_use]
            pub fn from_members(members: Vec<AnyPredicate<S>>) -> Self {
                Self(Compound::new($op, members))
            }

            #[must_use]
            pub fn members(&self) -> &[AnyPredicate<S>] {
                self.0.members()
            }

            #[must_use]
            pub fn into_compound(self) -> Compound<S> {
                self.0
            }
        }

        impl<S> Clone for $name<S> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<S> fmt::Debug for $name<S> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0.members()).finish()
            }
        }

        impl<S> fmt::Display for $name<S> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl<S: Schema> TypedPredicate for $name<S> {
            type Schema = S;

            fn erase(&self) -> AnyPredicate<S> {
                self.0.fold()
            }
        }
    };
}

logical! {
    /// Conjunction of its members. Empty is `TRUEPREDICATE`.
    And => LogicalOp::And
}

logical! {
    /// Disjunction of its members. Empty is `FALSEPREDICATE`.
    Or => LogicalOp::Or
}

logical! {
    /// Negation of its members, AND-folded into one subject.
    Not => LogicalOp::Not
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, FieldDescriptor};

    struct Ship;

    impl Schema for Ship {
        const ENTITY: &'static str = "Ship";

        fn fields() -> Vec<FieldDescriptor> {
            Vec::new()
        }
    }

    const COST: Field<Ship, i64> = Field::new("cost");
    const REAL: Field<Ship, bool> = Field::new("isReal");

    #[test]
    fn build_from_block() {
        let and = And::build(|b| {
            b.push(COST.gt(0)).push(COST.gt(1));
        });
        assert_eq!(and.render(), "cost > 0 AND cost > 1");
        assert_eq!(and.members().len(), 2);
    }

    #[test]
    fn single_member() {
        assert_eq!(And::single(REAL).render(), "isReal == 1");
        assert_eq!(Or::single(REAL).render(), "isReal == 1");
        assert_eq!(Not::single(REAL).render(), "NOT isReal == 1");
    }

    #[test]
    fn not_of_or() {
        let not = Not::single(Or::build(|b| {
            b.push(REAL.eq(false)).push(COST.gt(5));
        }));
        assert_eq!(not.render(), "NOT (isReal == 0 OR cost > 5)");
    }

    #[test]
    fn fluent_keeps_order() {
        assert_eq!(COST.gt(1).and(REAL).render(), "cost > 1 AND isReal == 1");
        assert_eq!(REAL.or(COST.gt(1)).render(), "isReal == 1 OR cost > 1");
    }

    #[test]
    fn debug_names_the_operator() {
        let debug = format!("{:?}", Or::single(REAL));
        assert!(debug.starts_with("Or("), "{debug}");
    }
}
