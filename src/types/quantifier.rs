use std::fmt;

use super::comparison::Comparison;
use super::compound::{fold, LogicalOp};
use super::field::ToMany;
use super::options::Modifier;
use super::predicate::{AnyPredicate, Shape, TypedPredicate};
use super::schema::Schema;

/// At least one member of a collection satisfies `inner`:
/// `ANY <collection>.<inner>`.
///
/// The inner comparison is written against the element schema `E`; its own
/// modifier is replaced by `ANY`.
pub struct AnyMembers<S, E> {
    collection: ToMany<S, E>,
    inner: Comparison<E>,
}

/// Alias kept for callers that read "some" more naturally than "any".
pub type SomeMembers<S, E> = AnyMembers<S, E>;

impl<S, E> AnyMembers<S, E> {
    #[must_use]
    pub fn new(collection: ToMany<S, E>, inner: impl Into<Comparison<E>>) -> Self {
        Self {
            collection,
            inner: inner.into(),
        }
    }

    #[must_use]
    pub fn collection(&self) -> &ToMany<S, E> {
        &self.collection
    }

    #[must_use]
    pub fn inner(&self) -> &Comparison<E> {
        &self.inner
    }

    /// The quantified comparison, re-rooted at `S`.
    #[must_use]
    pub fn lifted(&self) -> Comparison<S> {
        self.inner.rebase(self.collection.path(), Modifier::Any)
    }
}

/// No member of a collection satisfies `inner`: `NOT ANY <collection>.<inner>`.
///
/// There is no native `NONE` form in the output. The predicate is the
/// negation of the matching [`AnyMembers`].
pub struct NoMembers<S, E> {
    any: AnyMembers<S, E>,
}

impl<S, E> NoMembers<S, E> {
    #[must_use]
    pub fn new(collection: ToMany<S, E>, inner: impl Into<Comparison<E>>) -> Self {
        Self {
            any: AnyMembers::new(collection, inner),
        }
    }

    /// The `ANY` predicate this one negates.
    #[must_use]
    pub fn negated(&self) -> &AnyMembers<S, E> {
        &self.any
    }
}

impl<S, E> Clone for AnyMembers<S, E> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<S, E> Clone for NoMembers<S, E> {
    fn clone(&self) -> Self {
        Self {
            any: self.any.clone(),
        }
    }
}

impl<S, E> fmt::Debug for AnyMembers<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyMembers")
            .field("collection", &self.collection)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<S, E> fmt::Debug for NoMembers<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoMembers")
            .field("collection", &self.any.collection)
            .field("inner", &self.any.inner)
            .finish()
    }
}

impl<S: Schema, E> TypedPredicate for AnyMembers<S, E> {
    type Schema = S;

    fn erase(&self) -> AnyPredicate<S> {
        AnyPredicate::from_parts(self.lifted().to_string(), Shape::Atom)
    }
}

impl<S: Schema, E> TypedPredicate for NoMembers<S, E> {
    type Schema = S;

    fn erase(&self) -> AnyPredicate<S> {
        fold(LogicalOp::Not, &[self.any.erase()])
    }
}
