use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeInclusive;

use super::comparison::{CompareOp, Comparison, KeyPath};
use super::error::SchemaError;
use super::field_registry::{assert_path, registry, FieldDescriptor};
use super::kind::{FieldValue, Ordered, Textual, ValueKind};
use super::literal::{IntoLiteral, IntoOperand, Literal};
use super::options::Modifier;
use super::predicate::{AnyPredicate, TypedPredicate};
use super::quantifier::{AnyMembers, NoMembers};
use super::schema::Schema;

/// Typed reference to a field of `S` holding values of type `V`.
///
/// `V = Option<T>` declares a nullable field. The value type decides, at
/// compile time, which operators and operands a comparison accepts:
///
/// ```
/// # use predicate_builder::{Field, FieldDescriptor, Schema, TypedPredicate};
/// # struct Spaceship;
/// # impl Schema for Spaceship {
/// #     const ENTITY: &'static str = "Spaceship";
/// #     fn fields() -> Vec<FieldDescriptor> { Vec::new() }
/// # }
/// const COST: Field<Spaceship, i32> = Field::new("cost");
/// const DESCRIPTION: Field<Spaceship, Option<String>> = Field::new("shipDescription");
///
/// assert_eq!(COST.gt(0).render(), "cost > 0");
/// assert_eq!(DESCRIPTION.eq(None::<&str>).render(), "shipDescription == nil");
/// ```
///
/// `COST.eq("zero")` or `COST.like("1*")` do not compile.
pub struct Field<S, V> {
    key_path: KeyPath,
    _marker: PhantomData<fn() -> (S, V)>,
}

impl<S, V> Field<S, V> {
    /// # Panics
    ///
    /// If `path` is malformed or one of its segments is a reserved word of
    /// the render format. In a `const` item this is a compile error:
    ///
    /// ```compile_fail
    /// # use predicate_builder::Field;
    /// # struct Spaceship;
    /// const NOT_FLAG: Field<Spaceship, bool> = Field::new("not");
    /// # let _ = NOT_FLAG;
    /// ```
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        assert_path(path);
        Self {
            key_path: KeyPath::Path(Cow::Borrowed(path)),
            _marker: PhantomData,
        }
    }

    /// The record itself, rendered `SELF`. Used for collections of scalars.
    #[must_use]
    pub const fn evaluated_object() -> Self {
        Self {
            key_path: KeyPath::Evaluated,
            _marker: PhantomData,
        }
    }

    /// The dotted path this field renders as.
    #[must_use]
    pub fn path(&self) -> &str {
        self.key_path.as_str()
    }

    #[must_use]
    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    fn compare(&self, op: CompareOp, operand: Literal) -> Comparison<S> {
        Comparison::from_parts(self.key_path.clone(), op, operand)
    }
}

impl<S, V: FieldValue> Field<S, V> {
    #[must_use]
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor::new(self.path(), V::KIND, V::NULLABLE)
    }

    #[must_use]
    pub fn eq(&self, value: impl IntoOperand<V>) -> Comparison<S> {
        self.compare(CompareOp::Eq, value.into_operand())
    }

    #[must_use]
    pub fn neq(&self, value: impl IntoOperand<V>) -> Comparison<S> {
        self.compare(CompareOp::Neq, value.into_operand())
    }

    /// `path IN {a, b, …}`, in iteration order.
    #[must_use]
    pub fn is_in<I>(&self, values: I) -> Comparison<S>
    where
        I: IntoIterator,
        I::Item: IntoLiteral<V>,
    {
        let items = values.into_iter().map(IntoLiteral::into_literal).collect();
        self.compare(CompareOp::In, Literal::List(items))
    }

    /// `path IN {…}` over the values of a map, in the map's iteration order.
    #[must_use]
    pub fn is_in_values<M, K, T>(&self, map: M) -> Comparison<S>
    where
        M: IntoIterator<Item = (K, T)>,
        T: IntoLiteral<V>,
    {
        self.is_in(map.into_iter().map(|(_, value)| value))
    }
}

impl<S: Schema, V: FieldValue> Field<S, V> {
    /// Resolve a field from a runtime path, checking it against the schema's
    /// registry.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownField`] if `S` does not declare `path`, and
    /// [`SchemaError::KindMismatch`] if it is declared with a different kind
    /// or nullability than `V`.
    pub fn lookup(path: &str) -> Result<Self, SchemaError> {
        let registry = registry::<S>()?;
        let declared = registry.get(path).ok_or_else(|| SchemaError::UnknownField {
            schema: S::ENTITY,
            path: path.to_owned(),
        })?;
        if declared.kind != V::KIND || declared.nullable != V::NULLABLE {
            return Err(SchemaError::KindMismatch {
                schema: S::ENTITY,
                path: path.to_owned(),
                declared: type_name(&declared.kind, declared.nullable),
                requested: type_name(&V::KIND, V::NULLABLE),
            });
        }
        Ok(Self {
            key_path: KeyPath::Path(Cow::Owned(declared.path.clone())),
            _marker: PhantomData,
        })
    }
}

fn type_name(kind: &ValueKind, nullable: bool) -> String {
    if nullable {
        format!("optional {kind}")
    } else {
        kind.to_string()
    }
}

impl<S, V: Ordered> Field<S, V> {
    #[must_use]
    pub fn lt(&self, value: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::Lt, value.into_literal())
    }

    #[must_use]
    pub fn lte(&self, value: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::Lte, value.into_literal())
    }

    #[must_use]
    pub fn gt(&self, value: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::Gt, value.into_literal())
    }

    #[must_use]
    pub fn gte(&self, value: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::Gte, value.into_literal())
    }

    /// `path BETWEEN {lower, upper}`, inclusive on both ends.
    #[must_use]
    pub fn between<T: IntoLiteral<V>>(&self, range: RangeInclusive<T>) -> Comparison<S> {
        let (lower, upper) = range.into_inner();
        let bounds = vec![lower.into_literal(), upper.into_literal()];
        self.compare(CompareOp::Between, Literal::List(bounds))
    }
}

impl<S, V: Textual> Field<S, V> {
    /// Wildcard match: `*` matches any run of characters, `?` a single one.
    #[must_use]
    pub fn like(&self, pattern: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::Like, pattern.into_literal())
    }

    #[must_use]
    pub fn begins_with(&self, prefix: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::BeginsWith, prefix.into_literal())
    }

    /// Alias of [`begins_with`](Field::begins_with).
    #[must_use]
    pub fn starts_with(&self, prefix: impl IntoLiteral<V>) -> Comparison<S> {
        self.begins_with(prefix)
    }

    #[must_use]
    pub fn contains(&self, needle: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::Contains, needle.into_literal())
    }

    #[must_use]
    pub fn ends_with(&self, suffix: impl IntoLiteral<V>) -> Comparison<S> {
        self.compare(CompareOp::EndsWith, suffix.into_literal())
    }
}

impl<S, V: FieldValue> Field<S, Option<V>> {
    #[must_use]
    pub fn is_nil(&self) -> Comparison<S> {
        self.compare(CompareOp::Eq, Literal::Nil)
    }

    #[must_use]
    pub fn is_not_nil(&self) -> Comparison<S> {
        self.compare(CompareOp::Neq, Literal::Nil)
    }
}

impl<S, V> Clone for Field<S, V> {
    fn clone(&self) -> Self {
        Self {
            key_path: self.key_path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, V> fmt::Debug for Field<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.path()).finish()
    }
}

/// A bare boolean field means `field == true`.
impl<S: Schema> TypedPredicate for Field<S, bool> {
    type Schema = S;

    fn erase(&self) -> AnyPredicate<S> {
        self.eq(true).erase()
    }
}

impl<S> From<Field<S, bool>> for Comparison<S> {
    fn from(field: Field<S, bool>) -> Self {
        field.compare(CompareOp::Eq, Literal::Bool(true))
    }
}

impl<S> From<&Field<S, bool>> for Comparison<S> {
    fn from(field: &Field<S, bool>) -> Self {
        field.compare(CompareOp::Eq, Literal::Bool(true))
    }
}

/// To-one relationship from `S` to `T`.
pub struct ToOne<S, T> {
    path: Cow<'static, str>,
    nullable: bool,
    _marker: PhantomData<fn() -> (S, T)>,
}

impl<S, T> ToOne<S, T> {
    /// # Panics
    ///
    /// Under the same conditions as [`Field::new`].
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        assert_path(path);
        Self {
            path: Cow::Borrowed(path),
            nullable: false,
            _marker: PhantomData,
        }
    }

    /// Declare the relationship optional.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A field of the related record, seen from `S`: `captain.name`.
    #[must_use]
    pub fn then<V>(&self, field: Field<T, V>) -> Field<S, V> {
        Field {
            key_path: field.key_path.under(&self.path),
            _marker: PhantomData,
        }
    }

    /// A to-one relationship of the related record: `captain.mentor`.
    #[must_use]
    pub fn then_one<U>(&self, next: ToOne<T, U>) -> ToOne<S, U> {
        ToOne {
            path: Cow::Owned(format!("{}.{}", self.path, next.path)),
            nullable: self.nullable || next.nullable,
            _marker: PhantomData,
        }
    }

    /// A collection of the related record: `captain.ships`.
    #[must_use]
    pub fn then_many<E>(&self, next: ToMany<T, E>) -> ToMany<S, E> {
        ToMany {
            path: Cow::Owned(format!("{}.{}", self.path, next.path)),
            nullable: self.nullable || next.nullable,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> Comparison<S> {
        Comparison::from_parts(KeyPath::Path(self.path.clone()), CompareOp::Eq, Literal::Nil)
    }

    #[must_use]
    pub fn is_not_nil(&self) -> Comparison<S> {
        Comparison::from_parts(KeyPath::Path(self.path.clone()), CompareOp::Neq, Literal::Nil)
    }
}

impl<S, T: Schema> ToOne<S, T> {
    #[must_use]
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor::new(self.path(), ValueKind::Object(T::ENTITY), self.nullable)
    }
}

impl<S, T> Clone for ToOne<S, T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            nullable: self.nullable,
            _marker: PhantomData,
        }
    }
}

impl<S, T> fmt::Debug for ToOne<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToOne").field(&self.path()).finish()
    }
}

/// To-many relationship from `S` to records of `E`.
///
/// Comparisons against `E` are lifted into `S` with a quantifier:
/// `fleetMembers.any(Spaceship::NAME.eq("TIE fighter"))` renders
/// `ANY fleetMembers.name == "TIE fighter"`.
pub struct ToMany<S, E> {
    path: Cow<'static, str>,
    nullable: bool,
    _marker: PhantomData<fn() -> (S, E)>,
}

impl<S, E> ToMany<S, E> {
    /// # Panics
    ///
    /// Under the same conditions as [`Field::new`].
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        assert_path(path);
        Self {
            path: Cow::Borrowed(path),
            nullable: false,
            _marker: PhantomData,
        }
    }

    /// Declare the relationship optional.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A relationship of the related records, seen from `S`:
    /// `fleetMembers.enemies`.
    #[must_use]
    pub fn then<F>(&self, next: ToMany<E, F>) -> ToMany<S, F> {
        ToMany {
            path: Cow::Owned(format!("{}.{}", self.path, next.path)),
            nullable: self.nullable || next.nullable,
            _marker: PhantomData,
        }
    }

    /// A to-one relationship of each related record, as a collection seen
    /// from `S`: `fleetMembers.captain`.
    #[must_use]
    pub fn then_one<T>(&self, next: ToOne<E, T>) -> ToMany<S, T> {
        ToMany {
            path: Cow::Owned(format!("{}.{}", self.path, next.path)),
            nullable: self.nullable || next.nullable,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn any(&self, inner: impl Into<Comparison<E>>) -> AnyMembers<S, E> {
        AnyMembers::new(self.clone(), inner)
    }

    #[must_use]
    pub fn none(&self, inner: impl Into<Comparison<E>>) -> NoMembers<S, E> {
        NoMembers::new(self.clone(), inner)
    }

    /// `ALL path.inner`
    #[must_use]
    pub fn all(&self, inner: impl Into<Comparison<E>>) -> Comparison<S> {
        inner.into().rebase(&self.path, Modifier::All)
    }

    #[must_use]
    pub fn is_nil(&self) -> Comparison<S> {
        self.compare(CompareOp::Eq, Literal::Nil)
    }

    #[must_use]
    pub fn is_not_nil(&self) -> Comparison<S> {
        self.compare(CompareOp::Neq, Literal::Nil)
    }

    /// `path == {}`
    #[must_use]
    pub fn is_empty(&self) -> Comparison<S> {
        self.compare(CompareOp::Eq, Literal::List(Vec::new()))
    }

    fn compare(&self, op: CompareOp, operand: Literal) -> Comparison<S> {
        Comparison::from_parts(KeyPath::Path(self.path.clone()), op, operand)
    }
}

impl<S, E: Schema> ToMany<S, E> {
    #[must_use]
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor::new(self.path(), ValueKind::Many(E::ENTITY), self.nullable)
    }
}

impl<S, E> Clone for ToMany<S, E> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            nullable: self.nullable,
            _marker: PhantomData,
        }
    }
}

impl<S, E> fmt::Debug for ToMany<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToMany").field(&self.path()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Nil;

    struct Ship;
    struct Person;

    impl Schema for Ship {
        const ENTITY: &'static str = "Ship";

        fn fields() -> Vec<FieldDescriptor> {
            vec![
                Ship::NAME.descriptor(),
                Ship::NICKNAME.descriptor(),
                Ship::COST.descriptor(),
                Ship::SPEED.descriptor(),
                Ship::ACTIVE.descriptor(),
                Ship::CAPTAIN.descriptor(),
                Ship::ESCORTS.descriptor(),
            ]
        }
    }

    impl Schema for Person {
        const ENTITY: &'static str = "Person";

        fn fields() -> Vec<FieldDescriptor> {
            vec![
                Person::NAME.descriptor(),
                Person::MENTOR.descriptor(),
                Person::SHIPS.descriptor(),
            ]
        }
    }

    impl Ship {
        const NAME: Field<Ship, String> = Field::new("name");
        const NICKNAME: Field<Ship, Option<String>> = Field::new("nickname");
        const COST: Field<Ship, i64> = Field::new("cost");
        const SPEED: Field<Ship, f64> = Field::new("speed");
        const ACTIVE: Field<Ship, bool> = Field::new("active");
        const CAPTAIN: ToOne<Ship, Person> = ToOne::new("captain").nullable();
        const ESCORTS: ToMany<Ship, Ship> = ToMany::new("escorts").nullable();
    }

    impl Person {
        const NAME: Field<Person, String> = Field::new("name");
        const MENTOR: ToOne<Person, Person> = ToOne::new("mentor").nullable();
        const SHIPS: ToMany<Person, Ship> = ToMany::new("ships");
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(Ship::COST.eq(5).to_string(), "cost == 5");
        assert_eq!(Ship::COST.neq(5).to_string(), "cost != 5");
        assert_eq!(Ship::COST.lt(5).to_string(), "cost < 5");
        assert_eq!(Ship::COST.lte(5).to_string(), "cost <= 5");
        assert_eq!(Ship::COST.gt(5).to_string(), "cost > 5");
        assert_eq!(Ship::COST.gte(5).to_string(), "cost >= 5");
        assert_eq!(Ship::SPEED.gt(0.5).to_string(), "speed > 0.5");
    }

    #[test]
    fn string_operators() {
        assert_eq!(Ship::NAME.like("T*").to_string(), r#"name LIKE "T*""#);
        assert_eq!(Ship::NAME.begins_with("T").to_string(), r#"name BEGINSWITH "T""#);
        assert_eq!(Ship::NAME.starts_with("T"), Ship::NAME.begins_with("T"));
        assert_eq!(Ship::NAME.contains("ar").to_string(), r#"name CONTAINS "ar""#);
        assert_eq!(Ship::NAME.ends_with("r").to_string(), r#"name ENDSWITH "r""#);
        assert_eq!(
            Ship::NICKNAME.contains("x").to_string(),
            r#"nickname CONTAINS "x""#
        );
    }

    #[test]
    fn range_and_membership() {
        assert_eq!(Ship::COST.between(0..=150).to_string(), "cost BETWEEN {0, 150}");
        assert_eq!(Ship::COST.is_in([1, 2, 3]).to_string(), "cost IN {1, 2, 3}");
        assert_eq!(
            Ship::NAME.is_in(vec!["a", "b"]).to_string(),
            r#"name IN {"a", "b"}"#
        );
        let map = std::collections::BTreeMap::from([("x", 10), ("y", 20)]);
        assert_eq!(Ship::COST.is_in_values(map).to_string(), "cost IN {10, 20}");
    }

    #[test]
    fn nil_and_absent_render_the_same() {
        let absent: Option<String> = None;
        assert_eq!(Ship::NICKNAME.eq(absent).to_string(), "nickname == nil");
        assert_eq!(Ship::NICKNAME.eq(Nil).to_string(), "nickname == nil");
        assert_eq!(Ship::NICKNAME.is_nil(), Ship::NICKNAME.eq(Nil));
        assert_eq!(Ship::NICKNAME.neq(Nil), Ship::NICKNAME.is_not_nil());
        assert_eq!(
            Ship::NICKNAME.eq(Some("Reaver")).to_string(),
            r#"nickname == "Reaver""#
        );
    }

    #[test]
    fn bool_field_is_eq_true() {
        assert_eq!(Ship::ACTIVE.render(), "active == 1");
        assert_eq!(Ship::ACTIVE.eq(false).to_string(), "active == 0");
        assert_eq!(Comparison::from(Ship::ACTIVE), Ship::ACTIVE.eq(true));
    }

    #[test]
    fn to_one_paths() {
        let captain_name = Ship::CAPTAIN.then(Person::NAME);
        assert_eq!(captain_name.path(), "captain.name");
        assert_eq!(captain_name.eq("Kirk").to_string(), r#"captain.name == "Kirk""#);
        assert_eq!(Ship::CAPTAIN.is_nil().to_string(), "captain == nil");
    }

    #[test]
    fn to_many_paths() {
        let nested = Ship::ESCORTS.then(Ship::ESCORTS);
        assert_eq!(nested.path(), "escorts.escorts");
        assert_eq!(Ship::ESCORTS.is_empty().to_string(), "escorts == {}");
        assert_eq!(Ship::ESCORTS.is_not_nil().to_string(), "escorts != nil");
        assert_eq!(
            Ship::ESCORTS.all(Ship::COST.gt(1)).to_string(),
            "ALL escorts.cost > 1"
        );
    }

    #[test]
    fn mixed_relationship_paths() {
        let mentor = Ship::CAPTAIN.then_one(Person::MENTOR);
        assert_eq!(mentor.path(), "captain.mentor");
        assert_eq!(
            mentor.then(Person::NAME).eq("Yoda").to_string(),
            r#"captain.mentor.name == "Yoda""#
        );
        assert_eq!(mentor.is_nil().to_string(), "captain.mentor == nil");

        let captains_ships = Ship::CAPTAIN.then_many(Person::SHIPS);
        assert_eq!(captains_ships.path(), "captain.ships");
        assert_eq!(
            captains_ships.any(Ship::COST.gt(1)).render(),
            "ANY captain.ships.cost > 1"
        );
        assert!(captains_ships.descriptor().nullable);

        let escort_captains = Ship::ESCORTS.then_one(Ship::CAPTAIN);
        assert_eq!(
            escort_captains.none(Person::NAME.eq("Kirk")).render(),
            r#"NOT ANY escorts.captain.name == "Kirk""#
        );
        assert_eq!(
            escort_captains.descriptor(),
            FieldDescriptor::new("escorts.captain", ValueKind::Many("Person"), true)
        );
    }

    #[test]
    #[should_panic(expected = "reserved word")]
    fn reserved_field_path_panics() {
        let _ = Field::<Ship, bool>::new("not");
    }

    #[test]
    #[should_panic(expected = "empty segment")]
    fn malformed_relationship_path_panics() {
        let _ = ToMany::<Ship, Ship>::new("fleet..members");
    }

    #[test]
    #[should_panic(expected = "reserved word")]
    fn reserved_to_one_path_panics() {
        let _ = ToOne::<Ship, Person>::new("captain.self");
    }

    #[test]
    fn self_reference() {
        let tag: Field<Ship, String> = Field::evaluated_object();
        assert_eq!(tag.path(), "SELF");
        assert_eq!(tag.eq("x").to_string(), r#"SELF == "x""#);
    }

    #[test]
    fn descriptors() {
        assert_eq!(
            Ship::NICKNAME.descriptor(),
            FieldDescriptor::new("nickname", ValueKind::String, true)
        );
        assert_eq!(
            Ship::ESCORTS.descriptor(),
            FieldDescriptor::new("escorts", ValueKind::Many("Ship"), true)
        );
        assert_eq!(
            Ship::CAPTAIN.descriptor(),
            FieldDescriptor::new("captain", ValueKind::Object("Person"), true)
        );
    }

    #[test]
    fn lookup_checks_the_registry() {
        let cost = Field::<Ship, i64>::lookup("cost").unwrap();
        assert_eq!(cost.gt(1).to_string(), "cost > 1");

        let err = Field::<Ship, i64>::lookup("warp").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { .. }));

        let err = Field::<Ship, String>::lookup("cost").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field 'cost' of schema 'Ship' is declared as int, not string"
        );

        let err = Field::<Ship, String>::lookup("nickname").unwrap_err();
        assert!(matches!(err, SchemaError::KindMismatch { declared, .. } if declared == "optional string"));
    }
}
