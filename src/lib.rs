//! Type-safe predicates for schema-described records.
//!
//! Fields are declared as typed constants on a [`Schema`]; comparisons,
//! quantifiers and logical combinators built from them render to the
//! predicate text format understood by the storage engine. A small reference
//! evaluator ([`CompiledPredicate`]) runs the same text against in-memory
//! [`Object`]s.
//!
//! ```
//! use predicate_builder::{Field, FieldDescriptor, Schema, TypedPredicate};
//!
//! struct Candy;
//!
//! impl Candy {
//!     const NAME: Field<Candy, String> = Field::new("name");
//!     const CALORIES: Field<Candy, i64> = Field::new("calories");
//! }
//!
//! impl Schema for Candy {
//!     const ENTITY: &'static str = "Candy";
//!
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![Self::NAME.descriptor(), Self::CALORIES.descriptor()]
//!     }
//! }
//!
//! let query = Candy::NAME.begins_with("Choc") & !Candy::CALORIES.gt(300);
//! assert_eq!(query.render(), "name BEGINSWITH \"Choc\" AND (NOT calories > 300)");
//! ```

mod block;
mod error;
mod evaluate;
#[macro_use]
mod macros;
pub mod parse;
mod types;

pub use block::{Block, Step};
pub use error::Error;
pub use evaluate::{CompiledPredicate, EvalError};
pub use types::{
    registry, And, AnyMembers, AnyPredicate, CompareOp, Comparison, ComparisonOptions, Compound,
    Field, FieldDescriptor, FieldRegistry, FieldValue, IntoLiteral, IntoOperand, KeyPath, Literal,
    LogicalOp, Modifier, Nil, NoMembers, Not, Object, Or, Ordered, Record, Schema, SchemaError,
    Shape, SomeMembers, Textual, ToMany, ToOne, TypedPredicate, Value, ValueKind,
};
