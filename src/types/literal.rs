use std::fmt;

/// Right-hand operand of a comparison, in the form it is rendered.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// The null literal. Renders as `nil`.
    Nil,
    /// Rendered numerically: `1` for true, `0` for false.
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// An ordered collection, used by `IN` and `BETWEEN`. Renders as `{a, b}`.
    List(Vec<Literal>),
}

impl Literal {
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Literal::Nil)
    }

    /// The elements of a list literal, or `None` for scalars.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Nil => write!(f, "nil"),
            Literal::Bool(v) => write!(f, "{}", u8::from(*v)),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::String(v) => {
                f.write_str("\"")?;
                for ch in v.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Literal::List(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(i64::from(v))
    }
}

impl From<i16> for Literal {
    fn from(v: i16) -> Self {
        Literal::Int(i64::from(v))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<f32> for Literal {
    fn from(v: f32) -> Self {
        Literal::Float(f64::from(v))
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_owned())
    }
}

/// Explicit null operand, for `field.eq(Nil)` on a nullable field.
///
/// Renders identically to a runtime `None` of the field's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nil;

/// A non-null value that may appear on the right of a comparison against a
/// field of type `V`.
pub trait IntoLiteral<V> {
    fn into_literal(self) -> Literal;
}

/// A value that may appear on the right of an equality comparison against a
/// field of type `V`.
///
/// For nullable fields (`V = Option<T>`), `Option::None` and [`Nil`] both
/// produce [`Literal::Nil`]. Non-nullable fields accept no null operand.
pub trait IntoOperand<V> {
    fn into_operand(self) -> Literal;
}

macro_rules! operands {
    ($field:ty => $($src:ty),+ $(,)?) => {
        $(
            impl IntoLiteral<$field> for $src {
                fn into_literal(self) -> Literal {
                    Literal::from(<$field>::from(self))
                }
            }

            impl IntoOperand<$field> for $src {
                fn into_operand(self) -> Literal {
                    IntoLiteral::<$field>::into_literal(self)
                }
            }

            impl IntoLiteral<Option<$field>> for $src {
                fn into_literal(self) -> Literal {
                    IntoLiteral::<$field>::into_literal(self)
                }
            }

            impl IntoOperand<Option<$field>> for $src {
                fn into_operand(self) -> Literal {
                    IntoLiteral::<$field>::into_literal(self)
                }
            }

            impl IntoOperand<Option<$field>> for Option<$src> {
                fn into_operand(self) -> Literal {
                    self.map_or(Literal::Nil, IntoLiteral::<$field>::into_literal)
                }
            }
        )+

        impl IntoOperand<Option<$field>> for Nil {
            fn into_operand(self) -> Literal {
                Literal::Nil
            }
        }
    };
}

operands!(String => String, &str, &String);
operands!(i64 => i64, i32, i16, i8, u32, u16, u8);
operands!(i32 => i32, i16, i8, u16, u8);
operands!(i16 => i16, i8, u8);
operands!(f64 => f64, f32);
operands!(f32 => f32);
operands!(bool => bool);
