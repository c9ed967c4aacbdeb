//! Block composition: the statements of a builder block each contribute a
//! [`Step`], and the block accumulates them in emission order.

use std::fmt;

use crate::types::{AnyPredicate, Compound, LogicalOp, Schema, TypedPredicate};

/// What one statement of a block contributes.
pub enum Step<S> {
    /// Nothing, e.g. an `if` without `else` whose condition was false.
    Empty,
    One(AnyPredicate<S>),
    /// The members of a loop or nested block, spliced in order.
    Many(Vec<AnyPredicate<S>>),
}

impl<S> Step<S> {
    #[must_use]
    pub fn into_vec(self) -> Vec<AnyPredicate<S>> {
        match self {
            Step::Empty => Vec::new(),
            Step::One(predicate) => vec![predicate],
            Step::Many(predicates) => predicates,
        }
    }
}

impl<S: Schema, P: TypedPredicate<Schema = S>> From<P> for Step<S> {
    fn from(predicate: P) -> Self {
        Step::One(predicate.erase())
    }
}

impl<S> From<Block<S>> for Step<S> {
    fn from(block: Block<S>) -> Self {
        block.into_step()
    }
}

impl<S> fmt::Debug for Step<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Empty => f.write_str("Empty"),
            Step::One(predicate) => f.debug_tuple("One").field(predicate).finish(),
            Step::Many(predicates) => f.debug_tuple("Many").field(predicates).finish(),
        }
    }
}

/// Accumulator for the steps of one block.
///
/// A block only accepts predicates over its own schema, so mixing schemas
/// inside one block is a type error.
///
/// ```
/// # use predicate_builder::{Block, Field, FieldDescriptor, Schema};
/// # struct Spaceship;
/// # impl Schema for Spaceship {
/// #     const ENTITY: &'static str = "Spaceship";
/// #     fn fields() -> Vec<FieldDescriptor> { Vec::new() }
/// # }
/// const COST: Field<Spaceship, i32> = Field::new("cost");
/// const IS_REAL: Field<Spaceship, bool> = Field::new("isReal");
///
/// let mut block = Block::new();
/// block.push(COST.gt(10)).when(true, |b| {
///     b.push(IS_REAL);
/// });
/// assert_eq!(block.finish().format(), "cost > 10 AND isReal == 1");
/// ```
pub struct Block<S> {
    items: Vec<AnyPredicate<S>>,
}

impl<S> Block<S> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a step.
    pub fn push(&mut self, step: impl Into<Step<S>>) -> &mut Self {
        match step.into() {
            Step::Empty => {}
            Step::One(predicate) => self.items.push(predicate),
            Step::Many(predicates) => self.items.extend(predicates),
        }
        self
    }

    #[must_use]
    pub fn with(mut self, step: impl Into<Step<S>>) -> Self {
        self.push(step);
        self
    }

    /// Optional branch: contributes nothing when `condition` is false.
    pub fn when(&mut self, condition: bool, steps: impl FnOnce(&mut Block<S>)) -> &mut Self {
        if condition {
            self.nest(steps);
        }
        self
    }

    pub fn either(
        &mut self,
        condition: bool,
        then: impl FnOnce(&mut Block<S>),
        otherwise: impl FnOnce(&mut Block<S>),
    ) -> &mut Self {
        if condition {
            self.nest(then)
        } else {
            self.nest(otherwise)
        }
    }

    /// Run `steps` once per item; every iteration's members are spliced in
    /// order.
    pub fn each<I: IntoIterator>(
        &mut self,
        items: I,
        mut steps: impl FnMut(&mut Block<S>, I::Item),
    ) -> &mut Self {
        let mut body = Block::new();
        for item in items {
            steps(&mut body, item);
        }
        self.push(body)
    }

    /// Fill a sub-block and splice its members into this one.
    pub fn nest(&mut self, steps: impl FnOnce(&mut Block<S>)) -> &mut Self {
        let mut inner = Block::new();
        steps(&mut inner);
        self.push(inner)
    }

    /// A fresh, empty block over the same schema.
    #[must_use]
    pub fn sub_block(&self) -> Block<S> {
        Block::new()
    }

    #[must_use]
    pub fn into_step(self) -> Step<S> {
        let mut items = self.items;
        match items.len() {
            0 => Step::Empty,
            1 => items.pop().map_or(Step::Empty, Step::One),
            _ => Step::Many(items),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnyPredicate<S>> {
        self.items.iter()
    }

    /// The accumulated members, in emission order.
    #[must_use]
    pub fn into_list(self) -> Vec<AnyPredicate<S>> {
        self.items
    }

    /// Collapse the block into one predicate.
    ///
    /// An empty block is `TRUEPREDICATE`, one member is returned unchanged,
    /// and several members are joined with AND.
    #[must_use]
    pub fn finish(self) -> AnyPredicate<S> {
        tracing::trace!(members = self.items.len(), "block finished");
        let mut items = self.items;
        match items.len() {
            0 => AnyPredicate::always(),
            1 => items.pop().unwrap_or_else(AnyPredicate::always),
            _ => Compound::new(LogicalOp::And, items).fold(),
        }
    }
}

impl<S> Default for Block<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Block<S> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<S> fmt::Debug for Block<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}
