use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use super::error::SchemaError;
use super::field_registry::{registry, FieldDescriptor};
use super::kind::ValueKind;
use super::literal::Literal;
use super::options::{ComparisonOptions, Modifier};
use super::predicate::{AnyPredicate, Shape, TypedPredicate};
use super::schema::Schema;

/// Comparison operators of the render format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    BeginsWith,
    Contains,
    EndsWith,
    In,
    Between,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::BeginsWith => "BEGINSWITH",
            CompareOp::Contains => "CONTAINS",
            CompareOp::EndsWith => "ENDSWITH",
            CompareOp::In => "IN",
            CompareOp::Between => "BETWEEN",
        }
    }

    /// Operators only defined on string fields.
    #[must_use]
    pub const fn is_string_op(self) -> bool {
        matches!(
            self,
            CompareOp::Like | CompareOp::BeginsWith | CompareOp::Contains | CompareOp::EndsWith
        )
    }

    #[must_use]
    pub const fn accepts_nil(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Neq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Left-hand operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPath {
    /// The evaluated record itself, rendered `SELF`.
    Evaluated,
    Path(Cow<'static, str>),
}

impl KeyPath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            KeyPath::Evaluated => "SELF",
            KeyPath::Path(path) => path,
        }
    }

    /// This key path as seen from the owner of the collection at `prefix`.
    pub(crate) fn under(&self, prefix: &str) -> KeyPath {
        match self {
            KeyPath::Evaluated => KeyPath::Path(Cow::Owned(prefix.to_owned())),
            KeyPath::Path(path) => KeyPath::Path(Cow::Owned(format!("{prefix}.{path}"))),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf predicate: `{modifier}{key path} {operator}{options} {operand}`.
///
/// Built by the comparison methods on [`Field`](super::Field) or, for paths
/// only known at runtime, by [`Comparison::try_new`].
pub struct Comparison<S> {
    key_path: KeyPath,
    op: CompareOp,
    operand: Literal,
    modifier: Modifier,
    options: ComparisonOptions,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Comparison<S> {
    pub(crate) fn from_parts(key_path: KeyPath, op: CompareOp, operand: Literal) -> Self {
        Self {
            key_path,
            op,
            operand,
            modifier: Modifier::Direct,
            options: ComparisonOptions::NONE,
            _schema: PhantomData,
        }
    }

    #[must_use]
    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    #[must_use]
    pub fn op(&self) -> CompareOp {
        self.op
    }

    #[must_use]
    pub fn operand(&self) -> &Literal {
        &self.operand
    }

    #[must_use]
    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    #[must_use]
    pub fn options(&self) -> ComparisonOptions {
        self.options
    }

    /// Add comparison options. Options accumulate as a set.
    #[must_use]
    pub fn with_options(mut self, options: ComparisonOptions) -> Self {
        self.options = self.options | options;
        self
    }

    #[must_use]
    pub fn case_insensitive(self) -> Self {
        self.with_options(ComparisonOptions::CASE_INSENSITIVE)
    }

    #[must_use]
    pub fn diacritic_insensitive(self) -> Self {
        self.with_options(ComparisonOptions::DIACRITIC_INSENSITIVE)
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Re-root this comparison under the collection at `prefix`, owned by `T`.
    pub(crate) fn rebase<T>(&self, prefix: &str, modifier: Modifier) -> Comparison<T> {
        Comparison {
            key_path: self.key_path.under(prefix),
            op: self.op,
            operand: self.operand.clone(),
            modifier,
            options: self.options,
            _schema: PhantomData,
        }
    }
}

impl<S: Schema> Comparison<S> {
    /// Validating constructor for a field path known only at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the path is not declared by `S`, or if the
    /// operand does not fit the operator or the field's declared kind.
    pub fn try_new(
        path: &str,
        op: CompareOp,
        operand: impl Into<Literal>,
    ) -> Result<Self, SchemaError> {
        let registry = registry::<S>()?;
        let descriptor = registry.get(path).ok_or_else(|| SchemaError::UnknownField {
            schema: S::ENTITY,
            path: path.to_owned(),
        })?;
        let operand = operand.into();
        validate(descriptor, op, &operand)?;
        Ok(Self::from_parts(
            KeyPath::Path(Cow::Owned(descriptor.path.clone())),
            op,
            operand,
        ))
    }
}

fn validate(descriptor: &FieldDescriptor, op: CompareOp, operand: &Literal) -> Result<(), SchemaError> {
    if op.is_string_op() && descriptor.kind != ValueKind::String {
        return Err(SchemaError::StringOperator {
            op,
            path: descriptor.path.clone(),
            kind: descriptor.kind.to_string(),
        });
    }
    match op {
        CompareOp::Between => match operand.as_list() {
            Some([lower, upper]) => {
                check_operand(descriptor, lower)?;
                check_operand(descriptor, upper)
            }
            _ => Err(SchemaError::BetweenBounds {
                found: operand.to_string(),
            }),
        },
        CompareOp::In => match operand.as_list() {
            Some(items) => items
                .iter()
                .try_for_each(|item| check_operand(descriptor, item)),
            None => Err(SchemaError::InOperand {
                found: operand.to_string(),
            }),
        },
        _ if operand.is_nil() => {
            if !op.accepts_nil() {
                Err(SchemaError::NilOperand { op })
            } else if !descriptor.nullable {
                Err(SchemaError::NotNullable {
                    path: descriptor.path.clone(),
                })
            } else {
                Ok(())
            }
        }
        _ => check_operand(descriptor, operand),
    }
}

fn check_operand(descriptor: &FieldDescriptor, operand: &Literal) -> Result<(), SchemaError> {
    let fits = match (&descriptor.kind, operand) {
        (ValueKind::Bool, Literal::Bool(_))
        | (ValueKind::Int, Literal::Int(_))
        | (ValueKind::Float, Literal::Int(_) | Literal::Float(_))
        | (ValueKind::String, Literal::String(_)) => true,
        // `== {}` tests a collection for emptiness
        (ValueKind::Many(_), Literal::List(items)) => items.is_empty(),
        _ => false,
    };
    if fits {
        Ok(())
    } else {
        Err(SchemaError::OperandMismatch {
            path: descriptor.path.clone(),
            kind: descriptor.kind.to_string(),
            operand: operand.to_string(),
        })
    }
}

impl<S> Clone for Comparison<S> {
    fn clone(&self) -> Self {
        Self {
            key_path: self.key_path.clone(),
            op: self.op,
            operand: self.operand.clone(),
            modifier: self.modifier,
            options: self.options,
            _schema: PhantomData,
        }
    }
}

impl<S> fmt::Debug for Comparison<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparison")
            .field("key_path", &self.key_path)
            .field("op", &self.op)
            .field("operand", &self.operand)
            .field("modifier", &self.modifier)
            .field("options", &self.options)
            .finish()
    }
}

impl<S> PartialEq for Comparison<S> {
    fn eq(&self, other: &Self) -> bool {
        self.key_path == other.key_path
            && self.op == other.op
            && self.operand == other.operand
            && self.modifier == other.modifier
            && self.options == other.options
    }
}

impl<S> fmt::Display for Comparison<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}{} {}",
            self.modifier, self.key_path, self.op, self.options, self.operand
        )
    }
}

impl<S: Schema> TypedPredicate for Comparison<S> {
    type Schema = S;

    fn erase(&self) -> AnyPredicate<S> {
        AnyPredicate::from_parts(self.to_string(), Shape::Atom)
    }
}
