use std::fmt;

/// Declared value category of a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    /// A to-one relationship to the named schema.
    Object(&'static str),
    /// A to-many relationship whose elements belong to the named schema.
    Many(&'static str),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Object(entity) => write!(f, "{entity}"),
            ValueKind::Many(entity) => write!(f, "many {entity}"),
        }
    }
}

/// Rust types a [`Field`](super::Field) may hold.
///
/// `Option<V>` marks a nullable field of kind `V::KIND`; only nullable fields
/// accept a nil operand.
pub trait FieldValue: 'static {
    const KIND: ValueKind;
    const NULLABLE: bool = false;
}

/// Field values that support `<`, `<=`, `>`, `>=` and `BETWEEN`.
pub trait Ordered: FieldValue {}

/// Field values that support the string operators (`LIKE`, `BEGINSWITH`,
/// `CONTAINS`, `ENDSWITH`).
pub trait Textual: FieldValue {}

impl FieldValue for bool {
    const KIND: ValueKind = ValueKind::Bool;
}

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::String;
}

macro_rules! numeric {
    ($kind:expr => $($ty:ty),+) => {
        $(
            impl FieldValue for $ty {
                const KIND: ValueKind = $kind;
            }

            impl Ordered for $ty {}
        )+
    };
}

numeric!(ValueKind::Int => i16, i32, i64);
numeric!(ValueKind::Float => f32, f64);

impl Ordered for String {}
impl Textual for String {}

impl<V: FieldValue> FieldValue for Option<V> {
    const KIND: ValueKind = V::KIND;
    const NULLABLE: bool = true;
}

impl<V: Ordered> Ordered for Option<V> {}
impl<V: Textual> Textual for Option<V> {}
