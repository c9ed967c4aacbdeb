use super::field_registry::FieldDescriptor;
use super::object::Object;

/// A record type predicates can be built against.
///
/// Implementors declare every field a predicate may reference. The
/// declaration is validated once, the first time the schema's
/// [`FieldRegistry`](super::FieldRegistry) is requested.
///
/// ```
/// use predicate_builder::{Field, FieldDescriptor, Schema};
///
/// struct Candy;
///
/// impl Candy {
///     const NAME: Field<Candy, String> = Field::new("name");
///     const CALORIES: Field<Candy, i64> = Field::new("calories");
/// }
///
/// impl Schema for Candy {
///     const ENTITY: &'static str = "Candy";
///
///     fn fields() -> Vec<FieldDescriptor> {
///         vec![Self::NAME.descriptor(), Self::CALORIES.descriptor()]
///     }
/// }
/// ```
pub trait Schema: 'static {
    /// Stable name identifying the schema.
    const ENTITY: &'static str;

    fn fields() -> Vec<FieldDescriptor>;
}

/// A schema whose instances can be handed to the evaluator.
pub trait Record: Schema {
    fn to_object(&self) -> Object;
}
