use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use super::literal::Literal;

/// A dynamic record as seen by the reference evaluator.
///
/// Keys may be dotted (`"captain.name"`); intermediate objects are created as
/// needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    fields: HashMap<String, Value>,
}

/// Values stored in an [`Object`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A to-one relationship.
    Object(Object),
    /// A to-many relationship or a collection of scalars.
    Many(Vec<Value>),
}

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dot-separated path. A non-object value in the way
    /// of a nested path is replaced by an object.
    pub fn insert(&mut self, path: &str, value: Value) {
        match path.split_once('.') {
            None => {
                self.fields.insert(path.to_owned(), value);
            }
            Some((head, rest)) => {
                let entry = self
                    .fields
                    .entry(head.to_owned())
                    .or_insert_with(|| Value::Object(Object::new()));
                if !matches!(entry, Value::Object(_)) {
                    *entry = Value::Object(Object::new());
                }
                if let Value::Object(nested) = entry {
                    nested.insert(rest, value);
                }
            }
        }
    }

    /// Look up a value by dot-separated path, descending through to-one
    /// relationships only.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((head, rest)) => match self.fields.get(head)? {
                Value::Object(nested) => nested.get(rest),
                _ => None,
            },
        }
    }

    /// The value stored directly under `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Value {
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Ordering between scalar values, or `None` when the two cannot be
    /// compared. Booleans order as `0`/`1` against numbers; nil is only equal
    /// to nil.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Nil, Value::Nil) => Some(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Float(a), b) => a.partial_cmp(&(b.as_integer()? as f64)),
            (a, Value::Float(b)) => (a.as_integer()? as f64).partial_cmp(b),
            (a, b) => a.as_integer()?.partial_cmp(&b.as_integer()?),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Many(_) => "collection",
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Nil | Value::Object(_) | Value::Many(_) => self.kind_name().to_owned(),
            scalar => format!("{} {scalar}", scalar.kind_name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Object(object) => {
                let mut keys: Vec<&String> = object.fields.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {}", object.fields[key])?;
                }
                f.write_str("}")
            }
            Value::Many(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Nil => Value::Nil,
            Literal::Bool(v) => Value::Bool(*v),
            Literal::Int(v) => Value::Int(*v),
            Literal::Float(v) => Value::Float(*v),
            Literal::String(v) => Value::String(v.clone()),
            Literal::List(items) => Value::Many(items.iter().map(Value::from).collect()),
        }
    }
}

macro_rules! value_from {
    ($variant:ident <= $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )+
    };
}

value_from!(Bool <= bool);
value_from!(Int <= i64, i32, i16, u32, u16, u8);
value_from!(Float <= f64, f32);
value_from!(String <= String, &str);
value_from!(Object <= Object);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Many(items.into_iter().map(Into::into).collect())
    }
}
