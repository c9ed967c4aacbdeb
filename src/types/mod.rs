mod comparison;
mod compound;
mod error;
mod field;
mod field_registry;
mod kind;
mod literal;
mod logical;
mod object;
mod ops;
mod options;
mod predicate;
mod quantifier;
mod schema;

pub use comparison::{CompareOp, Comparison, KeyPath};
pub use compound::{Compound, LogicalOp};
pub use error::SchemaError;
pub use field::{Field, ToMany, ToOne};
pub use field_registry::{registry, FieldDescriptor, FieldRegistry};
pub use kind::{FieldValue, Ordered, Textual, ValueKind};
pub use literal::{IntoLiteral, IntoOperand, Literal, Nil};
pub use logical::{And, Not, Or};
pub use object::{Object, Value};
pub use options::{ComparisonOptions, Modifier};
pub use predicate::{AnyPredicate, Shape, TypedPredicate};
pub use quantifier::{AnyMembers, NoMembers, SomeMembers};
pub use schema::{Record, Schema};
