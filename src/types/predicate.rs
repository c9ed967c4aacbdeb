use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::evaluate::CompiledPredicate;
use crate::parse::{self, ParseError};
use crate::Error;

use super::logical::{And, Or};
use super::schema::{Record, Schema};

/// Top-level grouping of a rendered predicate. Combinators use it to decide
/// whether a member needs parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A comparison, quantifier or `FALSEPREDICATE`.
    Atom,
    /// `TRUEPREDICATE`, the identity of AND.
    True,
    And,
    Or,
    Not,
}

/// A predicate reduced to its rendered text.
///
/// Erasure keeps only the format string and its [`Shape`]. The schema
/// parameter exists for type checking; nothing at runtime depends on it.
pub struct AnyPredicate<S> {
    format: String,
    shape: Shape,
    _schema: PhantomData<fn() -> S>,
}

pub(crate) const TRUE_FORMAT: &str = "TRUEPREDICATE";
pub(crate) const FALSE_FORMAT: &str = "FALSEPREDICATE";

impl<S> AnyPredicate<S> {
    pub(crate) fn from_parts(format: String, shape: Shape) -> Self {
        Self {
            format,
            shape,
            _schema: PhantomData,
        }
    }

    /// The predicate matching every record.
    #[must_use]
    pub fn always() -> Self {
        Self::from_parts(TRUE_FORMAT.to_owned(), Shape::True)
    }

    /// The predicate matching no record.
    #[must_use]
    pub fn never() -> Self {
        Self::from_parts(FALSE_FORMAT.to_owned(), Shape::Atom)
    }

    /// Erase an arbitrary predicate string.
    ///
    /// The text is kept as given, trimmed and without parentheses that
    /// enclose all of it; parsing only recovers its shape.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `text` is not in the render format.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let expr = parse::parse(text)?;
        let text = parse::strip_enclosing(text);
        Ok(Self::from_parts(text.to_owned(), expr.shape()))
    }

    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    #[must_use]
    pub fn into_format(self) -> String {
        self.format
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether this is the `TRUEPREDICATE` identity.
    #[must_use]
    pub fn is_always(&self) -> bool {
        self.shape == Shape::True
    }
}

impl<S> Clone for AnyPredicate<S> {
    fn clone(&self) -> Self {
        Self::from_parts(self.format.clone(), self.shape)
    }
}

impl<S> fmt::Debug for AnyPredicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyPredicate")
            .field("format", &self.format)
            .field("shape", &self.shape)
            .finish()
    }
}

impl<S> fmt::Display for AnyPredicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format)
    }
}

impl<S> PartialEq for AnyPredicate<S> {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
    }
}

impl<S> Eq for AnyPredicate<S> {}

impl<S> Hash for AnyPredicate<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.format.hash(state);
    }
}

#[cfg(feature = "serde")]
impl<S> serde::Serialize for AnyPredicate<S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(&self.format)
    }
}

#[cfg(feature = "serde")]
impl<'de, S> serde::Deserialize<'de> for AnyPredicate<S> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// A predicate node valid against records of one schema.
///
/// Implementors only provide [`erase`](TypedPredicate::erase); rendering,
/// evaluation and the fluent combinators are derived from it.
pub trait TypedPredicate {
    type Schema: Schema;

    fn erase(&self) -> AnyPredicate<Self::Schema>;

    fn render(&self) -> String {
        self.erase().into_format()
    }

    /// Evaluate against one record with the reference evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the schema's field declaration is
    /// invalid, [`Error::Parse`] if the rendered text cannot be read back and
    /// [`Error::Eval`] if the record does not support the comparison.
    fn evaluate(&self, record: &Self::Schema) -> Result<bool, Error>
    where
        Self::Schema: Record,
    {
        let compiled = CompiledPredicate::compile(&self.erase())?;
        Ok(compiled.evaluate(record)?)
    }

    /// The records this predicate matches, in input order.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](TypedPredicate::evaluate); stops at the first
    /// record that fails.
    fn filter<'r>(&self, records: &'r [Self::Schema]) -> Result<Vec<&'r Self::Schema>, Error>
    where
        Self::Schema: Record,
    {
        let compiled = CompiledPredicate::compile(&self.erase())?;
        Ok(compiled.filter(records)?)
    }

    /// `self AND other`, in that order.
    fn and<P>(&self, other: P) -> And<Self::Schema>
    where
        P: TypedPredicate<Schema = Self::Schema>,
        Self: Sized,
    {
        And::from_members(vec![self.erase(), other.erase()])
    }

    /// `self OR other`, in that order.
    fn or<P>(&self, other: P) -> Or<Self::Schema>
    where
        P: TypedPredicate<Schema = Self::Schema>,
        Self: Sized,
    {
        Or::from_members(vec![self.erase(), other.erase()])
    }
}

impl<S: Schema> TypedPredicate for AnyPredicate<S> {
    type Schema = S;

    fn erase(&self) -> AnyPredicate<S> {
        self.clone()
    }
}

impl<P: TypedPredicate> TypedPredicate for &P {
    type Schema = P::Schema;

    fn erase(&self) -> AnyPredicate<P::Schema> {
        (**self).erase()
    }
}
