//! Reference evaluator: runs rendered predicates against in-memory records.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use regex::Regex;
use thiserror::Error;

use crate::parse::{self, Compare, Expr, Operand, Quantifier};
use crate::types::{
    registry, AnyPredicate, CompareOp, ComparisonOptions, Literal, Object, Record, Schema, Value,
};
use crate::Error;

/// Failures raised while evaluating a predicate against a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("record has no field '{path}'")]
    MissingField { path: String },

    #[error("cannot read '{path}': '{segment}' is {found}")]
    NotTraversable {
        path: String,
        segment: String,
        found: String,
    },

    #[error("cannot apply {op} to {lhs} and {rhs}")]
    Incomparable {
        op: CompareOp,
        lhs: String,
        rhs: String,
    },

    #[error("invalid operand for {op}: {detail}")]
    InvalidOperand { op: CompareOp, detail: String },

    #[error("SELF can only be compared inside a collection quantifier")]
    SelfComparison,
}

static NIL: Value = Value::Nil;

/// A predicate parsed once and ready to be evaluated many times.
///
/// `LIKE` patterns are compiled to regular expressions up front.
pub struct CompiledPredicate<S> {
    format: String,
    expr: Expr,
    patterns: HashMap<(String, ComparisonOptions), Regex>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> CompiledPredicate<S> {
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `S` declares an invalid field,
    /// [`Error::Parse`] if the predicate text cannot be read, or
    /// [`Error::Eval`] if a `LIKE` pattern cannot be compiled.
    pub fn compile(predicate: &AnyPredicate<S>) -> Result<Self, Error> {
        registry::<S>()?;
        let expr = parse::parse(predicate.format())?;

        let mut likes = Vec::new();
        expr.for_each_compare(&mut |compare| {
            if compare.op == CompareOp::Like {
                likes.push(compare);
            }
        });
        let mut patterns = HashMap::new();
        for compare in likes {
            if let Literal::String(pattern) = &compare.rhs {
                let key = (pattern.clone(), compare.options);
                if !patterns.contains_key(&key) {
                    let regex = like_regex(pattern, compare.options)?;
                    patterns.insert(key, regex);
                }
            }
        }

        tracing::debug!(
            predicate = predicate.format(),
            patterns = patterns.len(),
            "predicate compiled"
        );
        Ok(Self {
            format: predicate.format().to_owned(),
            expr,
            patterns,
            _schema: PhantomData,
        })
    }
}

impl<S> CompiledPredicate<S> {
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// # Errors
    ///
    /// Returns [`EvalError`] if the object lacks a referenced field or holds
    /// a value the comparison cannot be applied to.
    pub fn evaluate_object(&self, object: &Object) -> Result<bool, EvalError> {
        self.eval(&self.expr, object)
    }

    fn eval(&self, expr: &Expr, object: &Object) -> Result<bool, EvalError> {
        match expr {
            Expr::True => Ok(true),
            Expr::False => Ok(false),
            Expr::And(items) => {
                for item in items {
                    if !self.eval(item, object)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Expr::Or(items) => {
                for item in items {
                    if self.eval(item, object)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Expr::Not(inner) => Ok(!self.eval(inner, object)?),
            Expr::Compare(compare) => self.compare(compare, object),
        }
    }

    fn compare(&self, compare: &Compare, object: &Object) -> Result<bool, EvalError> {
        let rhs = Value::from(&compare.rhs);
        let lhs = resolve(object, &compare.lhs)?;
        let test = |value: &Value| self.test(compare, value, &rhs);
        match compare.quantifier {
            Quantifier::Direct => match lhs {
                Resolved::One(value) => test(value),
                Resolved::Many(values) => test(&Value::Many(values.into_iter().cloned().collect())),
            },
            Quantifier::Any => any_member(lhs.members(), test),
            Quantifier::None => any_member(lhs.members(), test).map(|found| !found),
            Quantifier::All => {
                for value in lhs.members() {
                    if !test(value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn test(&self, compare: &Compare, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
        let op = compare.op;
        let options = compare.options;
        match op {
            CompareOp::Eq => equals(op, lhs, rhs, options),
            CompareOp::Neq => equals(op, lhs, rhs, options).map(|eq| !eq),
            CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
                if lhs.is_nil() || rhs.is_nil() {
                    return Ok(false);
                }
                let ordering = match order(op, lhs, rhs, options)? {
                    Some(ordering) => ordering,
                    None => return Ok(false),
                };
                Ok(match op {
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Lte => ordering != Ordering::Greater,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
            }
            CompareOp::Between => {
                let [lower, upper] = match rhs {
                    Value::Many(bounds) if bounds.len() == 2 => [&bounds[0], &bounds[1]],
                    _ => {
                        return Err(EvalError::InvalidOperand {
                            op,
                            detail: format!("expected two bounds, got {rhs}"),
                        })
                    }
                };
                if lhs.is_nil() {
                    return Ok(false);
                }
                match (order(op, lhs, lower, options)?, order(op, lhs, upper, options)?) {
                    (Some(low), Some(high)) => Ok(low != Ordering::Less && high != Ordering::Greater),
                    _ => Ok(false),
                }
            }
            CompareOp::In => match rhs {
                Value::Many(items) => {
                    for item in items {
                        if equals(op, lhs, item, options)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                _ => Err(EvalError::InvalidOperand {
                    op,
                    detail: format!("expected a list, got {rhs}"),
                }),
            },
            CompareOp::Like | CompareOp::BeginsWith | CompareOp::Contains | CompareOp::EndsWith => {
                let (subject, needle) = match (lhs, rhs) {
                    (Value::Nil, _) => return Ok(false),
                    (Value::String(subject), Value::String(needle)) => (subject, needle),
                    _ => return Err(incomparable(op, lhs, rhs)),
                };
                let subject = fold(subject, options);
                if op == CompareOp::Like {
                    let regex = self
                        .patterns
                        .get(&(needle.clone(), options))
                        .ok_or_else(|| EvalError::InvalidOperand {
                            op,
                            detail: format!("pattern \"{needle}\" was not compiled"),
                        })?;
                    return Ok(regex.is_match(&subject));
                }
                let needle = fold(needle, options);
                Ok(match op {
                    CompareOp::BeginsWith => subject.starts_with(needle.as_ref()),
                    CompareOp::Contains => subject.contains(needle.as_ref()),
                    _ => subject.ends_with(needle.as_ref()),
                })
            }
        }
    }
}

impl<S: Record> CompiledPredicate<S> {
    /// # Errors
    ///
    /// See [`evaluate_object`](CompiledPredicate::evaluate_object).
    pub fn evaluate(&self, record: &S) -> Result<bool, EvalError> {
        self.evaluate_object(&record.to_object())
    }

    /// The records matching this predicate, in input order.
    ///
    /// # Errors
    ///
    /// Stops at the first record that fails to evaluate.
    pub fn filter<'r>(&self, records: &'r [S]) -> Result<Vec<&'r S>, EvalError> {
        let mut matched = Vec::new();
        for record in records {
            if self.evaluate(record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}

impl<S> Clone for CompiledPredicate<S> {
    fn clone(&self) -> Self {
        Self {
            format: self.format.clone(),
            expr: self.expr.clone(),
            patterns: self.patterns.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S> fmt::Debug for CompiledPredicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("format", &self.format)
            .field("expr", &self.expr)
            .finish_non_exhaustive()
    }
}

/// Values reached by a key path. Crossing a to-many relationship yields
/// every reachable value.
enum Resolved<'a> {
    One(&'a Value),
    Many(Vec<&'a Value>),
}

impl<'a> Resolved<'a> {
    /// The values a quantifier ranges over. A nil collection is empty.
    fn members(self) -> Vec<&'a Value> {
        match self {
            Resolved::One(Value::Many(items)) => items.iter().collect(),
            Resolved::One(Value::Nil) => Vec::new(),
            Resolved::One(value) => vec![value],
            Resolved::Many(values) => values
                .into_iter()
                .flat_map(|value| match value {
                    Value::Many(items) => items.iter().collect(),
                    other => vec![other],
                })
                .collect(),
        }
    }
}

fn resolve<'a>(object: &'a Object, operand: &Operand) -> Result<Resolved<'a>, EvalError> {
    match operand {
        Operand::Evaluated => Err(EvalError::SelfComparison),
        Operand::Path(segments) => walk(object, segments, segments),
    }
}

fn walk<'a>(object: &'a Object, rest: &[String], full: &[String]) -> Result<Resolved<'a>, EvalError> {
    let (head, tail) = match rest.split_first() {
        Some(split) => split,
        None => return Ok(Resolved::One(&NIL)),
    };
    let value = object
        .field(head)
        .ok_or_else(|| EvalError::MissingField {
            path: full.join("."),
        })?;
    if tail.is_empty() {
        return Ok(Resolved::One(value));
    }
    match value {
        Value::Object(nested) => walk(nested, tail, full),
        // a nil to-one relationship yields nil for every path below it
        Value::Nil => Ok(Resolved::One(&NIL)),
        Value::Many(items) => {
            let mut values = Vec::new();
            for item in items {
                match item {
                    Value::Object(nested) => match walk(nested, tail, full)? {
                        Resolved::One(value) => values.push(value),
                        Resolved::Many(more) => values.extend(more),
                    },
                    Value::Nil => {}
                    other => return Err(not_traversable(full, head, other)),
                }
            }
            Ok(Resolved::Many(values))
        }
        other => Err(not_traversable(full, head, other)),
    }
}

fn not_traversable(full: &[String], segment: &str, found: &Value) -> EvalError {
    EvalError::NotTraversable {
        path: full.join("."),
        segment: segment.to_owned(),
        found: found.describe(),
    }
}

fn any_member<'a>(
    values: Vec<&'a Value>,
    test: impl Fn(&'a Value) -> Result<bool, EvalError>,
) -> Result<bool, EvalError> {
    for value in values {
        if test(value)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn incomparable(op: CompareOp, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::Incomparable {
        op,
        lhs: lhs.describe(),
        rhs: rhs.describe(),
    }
}

fn equals(op: CompareOp, lhs: &Value, rhs: &Value, options: ComparisonOptions) -> Result<bool, EvalError> {
    match (lhs, rhs) {
        (Value::Nil, other) | (other, Value::Nil) => Ok(other.is_nil()),
        (Value::String(a), Value::String(b)) => Ok(fold(a, options) == fold(b, options)),
        (Value::Many(a), Value::Many(b)) => {
            if a.len() != b.len() {
                return Ok(false);
            }
            for (x, y) in a.iter().zip(b) {
                if !equals(op, x, y, options)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Object(a), Value::Object(b)) => Ok(a == b),
        _ if unordered(lhs, rhs) => Ok(false),
        _ => lhs
            .partial_cmp_value(rhs)
            .map(|ordering| ordering == Ordering::Equal)
            .ok_or_else(|| incomparable(op, lhs, rhs)),
    }
}

/// `None` when a NaN makes the operands unordered.
fn order(
    op: CompareOp,
    lhs: &Value,
    rhs: &Value,
    options: ComparisonOptions,
) -> Result<Option<Ordering>, EvalError> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(Some(fold(a, options).cmp(&fold(b, options)))),
        _ if unordered(lhs, rhs) => Ok(None),
        _ => lhs
            .partial_cmp_value(rhs)
            .map(Some)
            .ok_or_else(|| incomparable(op, lhs, rhs)),
    }
}

/// NaN against any number: neither equal nor ordered, but not a type error.
fn unordered(lhs: &Value, rhs: &Value) -> bool {
    let nan = |v: &Value| matches!(v, Value::Float(f) if f.is_nan());
    let numeric = |v: &Value| matches!(v, Value::Int(_) | Value::Float(_) | Value::Bool(_));
    (nan(lhs) && numeric(rhs)) || (nan(rhs) && numeric(lhs))
}

/// Apply `[c]` and `[d]` folding to a string.
fn fold(text: &str, options: ComparisonOptions) -> Cow<'_, str> {
    if options.is_empty() {
        return Cow::Borrowed(text);
    }
    let case = options.contains(ComparisonOptions::CASE_INSENSITIVE);
    let diacritics = options.contains(ComparisonOptions::DIACRITIC_INSENSITIVE);
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        let c = if diacritics { strip_diacritic(c) } else { c };
        if case {
            folded.extend(c.to_lowercase());
        } else {
            folded.push(c);
        }
    }
    Cow::Owned(folded)
}

/// Base letter for the accented Latin letters in common use.
fn strip_diacritic(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'È'..='Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'ì'..='ï' | 'ī' | 'į' => 'i',
        'Ì'..='Ï' | 'Ī' | 'Į' => 'I',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ő' => 'O',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'Ù'..='Ü' | 'Ū' | 'Ů' | 'Ű' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' | 'Ÿ' => 'Y',
        'ś' | 'š' => 's',
        'Ś' | 'Š' => 'S',
        'ź' | 'ż' | 'ž' => 'z',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ł' => 'l',
        'Ł' => 'L',
        other => other,
    }
}

/// `*` matches any run of characters and `?` exactly one; everything else is
/// literal. The pattern is folded the same way as the subject.
fn like_regex(pattern: &str, options: ComparisonOptions) -> Result<Regex, EvalError> {
    let folded = fold(pattern, options);
    let mut source = String::with_capacity(folded.len() + 8);
    source.push_str("^(?s:");
    let mut buf = [0_u8; 4];
    for c in folded.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    source.push_str(")$");
    Regex::new(&source).map_err(|err| EvalError::InvalidOperand {
        op: CompareOp::Like,
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ship;

    impl Schema for Ship {
        const ENTITY: &'static str = "Ship";

        fn fields() -> Vec<crate::FieldDescriptor> {
            Vec::new()
        }
    }

    fn eval(text: &str, object: &Object) -> Result<bool, EvalError> {
        let predicate = AnyPredicate::<Ship>::parse(text).unwrap();
        CompiledPredicate::compile(&predicate)
            .unwrap()
            .evaluate_object(object)
    }

    fn ship(name: &str, cost: i64) -> Object {
        Object::new().set("name", name).set("cost", cost)
    }

    fn fleet() -> Object {
        ship("Death Star", 1_000_000_000).set(
            "fleetMembers",
            vec![
                ship("TIE fighter", 0).set("enemies", vec![ship("X-Wing", 0)]),
                ship("TIE bomber", 5).set("enemies", Vec::<Object>::new()),
            ],
        )
    }

    #[test]
    fn eval_scalar_comparisons() {
        let obj = ship("Tardis", 100);
        assert_eq!(eval("cost > 99", &obj), Ok(true));
        assert_eq!(eval("cost >= 101", &obj), Ok(false));
        assert_eq!(eval("cost BETWEEN {100, 150}", &obj), Ok(true));
        assert_eq!(eval("cost IN {1, 2, 100}", &obj), Ok(true));
        assert_eq!(eval(r#"name != "Tardis""#, &obj), Ok(false));
    }

    #[test]
    fn eval_bool_as_number() {
        let obj = Object::new().set("isReal", true);
        assert_eq!(eval("isReal == 1", &obj), Ok(true));
        assert_eq!(eval("isReal == 0", &obj), Ok(false));
        assert_eq!(eval("isReal == TRUE", &obj), Ok(true));
    }

    #[test]
    fn eval_nil() {
        let obj = Object::new().set("shipDescription", Value::Nil).set("cost", 3_i64);
        assert_eq!(eval("shipDescription == nil", &obj), Ok(true));
        assert_eq!(eval(r#"shipDescription != "x""#, &obj), Ok(true));
        assert_eq!(eval("cost == nil", &obj), Ok(false));
        assert_eq!(eval("shipDescription < 3", &obj), Ok(false));
        assert_eq!(eval(r#"shipDescription CONTAINS "x""#, &obj), Ok(false));
    }

    #[test]
    fn eval_string_operators() {
        let obj = ship("Death Star", 1);
        assert_eq!(eval(r#"name BEGINSWITH "Death""#, &obj), Ok(true));
        assert_eq!(eval(r#"name ENDSWITH "Star""#, &obj), Ok(true));
        assert_eq!(eval(r#"name CONTAINS "th S""#, &obj), Ok(true));
        assert_eq!(eval(r#"name LIKE "D*S?ar""#, &obj), Ok(true));
        assert_eq!(eval(r#"name LIKE "d*""#, &obj), Ok(false));
        assert_eq!(eval(r#"name LIKE[c] "d*""#, &obj), Ok(true));
        assert_eq!(eval(r#"name LIKE "Death.Star""#, &obj), Ok(false));
    }

    #[test]
    fn eval_folding_options() {
        let obj = Object::new().set("name", "Crème Brûlée");
        assert_eq!(eval(r#"name == "creme brulee""#, &obj), Ok(false));
        assert_eq!(eval(r#"name ==[c] "crème brûlée""#, &obj), Ok(true));
        assert_eq!(eval(r#"name ==[d] "Creme Brulee""#, &obj), Ok(true));
        assert_eq!(eval(r#"name ==[cd] "creme brulee""#, &obj), Ok(true));
    }

    #[test]
    fn eval_quantifiers_over_relationships() {
        let obj = fleet();
        assert_eq!(eval(r#"ANY fleetMembers.name == "TIE fighter""#, &obj), Ok(true));
        assert_eq!(eval(r#"NOT ANY fleetMembers.name == "TIE fighter""#, &obj), Ok(false));
        assert_eq!(eval(r#"NONE fleetMembers.name == "X-Wing""#, &obj), Ok(true));
        assert_eq!(eval(r#"ALL fleetMembers.name BEGINSWITH "TIE""#, &obj), Ok(true));
        assert_eq!(eval("ALL fleetMembers.cost > 0", &obj), Ok(false));
        assert_eq!(eval(r#"ANY fleetMembers.enemies.name == "X-Wing""#, &obj), Ok(true));
    }

    #[test]
    fn eval_quantifiers_over_empty_and_nil() {
        let empty = ship("Tardis", 100).set("fleetMembers", Vec::<Object>::new());
        assert_eq!(eval(r#"ANY fleetMembers.name == "x""#, &empty), Ok(false));
        assert_eq!(eval(r#"ALL fleetMembers.name == "x""#, &empty), Ok(true));
        assert_eq!(eval("fleetMembers == {}", &empty), Ok(true));
        assert_eq!(eval("fleetMembers == {}", &fleet()), Ok(false));

        let nil = ship("Tardis", 100).set("fleetMembers", Value::Nil);
        assert_eq!(eval("fleetMembers == nil", &nil), Ok(true));
        assert_eq!(eval(r#"ANY fleetMembers.name == "x""#, &nil), Ok(false));
    }

    #[test]
    fn eval_scalar_collections() {
        let obj = Object::new().set("tags", vec!["fast", "armed"]);
        assert_eq!(eval(r#"ANY tags == "armed""#, &obj), Ok(true));
        assert_eq!(eval(r#"ANY tags == "slow""#, &obj), Ok(false));
    }

    #[test]
    fn eval_nested_to_one() {
        let obj = Object::new().set("captain.name", "Kirk");
        assert_eq!(eval(r#"captain.name == "Kirk""#, &obj), Ok(true));
        let nil = Object::new().set("captain", Value::Nil);
        assert_eq!(eval("captain.name == nil", &nil), Ok(true));
    }

    #[test]
    fn eval_logical() {
        let obj = ship("Tardis", 100);
        assert_eq!(eval(r#"cost > 0 AND name == "Tardis""#, &obj), Ok(true));
        assert_eq!(eval(r#"cost > 1000 OR name == "Tardis""#, &obj), Ok(true));
        assert_eq!(eval("NOT (cost > 0 AND cost < 10)", &obj), Ok(true));
        assert_eq!(eval("TRUEPREDICATE", &obj), Ok(true));
        assert_eq!(eval("FALSEPREDICATE", &obj), Ok(false));
    }

    #[test]
    fn eval_errors() {
        let obj = ship("Tardis", 100);
        assert_eq!(
            eval("warp > 9", &obj),
            Err(EvalError::MissingField { path: "warp".into() })
        );
        assert!(matches!(
            eval(r#"cost == "a lot""#, &obj),
            Err(EvalError::Incomparable { op: CompareOp::Eq, .. })
        ));
        assert!(matches!(
            eval("name.first == 1", &obj),
            Err(EvalError::NotTraversable { .. })
        ));
        assert!(matches!(
            eval("cost BETWEEN {1, 2, 3}", &obj),
            Err(EvalError::InvalidOperand { .. })
        ));
        assert_eq!(eval(r#"SELF == "x""#, &obj), Err(EvalError::SelfComparison));
    }

    #[test]
    fn error_messages() {
        let err = EvalError::Incomparable {
            op: CompareOp::Gt,
            lhs: "int 3".into(),
            rhs: "string \"x\"".into(),
        };
        assert_eq!(err.to_string(), r#"cannot apply > to int 3 and string "x""#);
        assert_eq!(
            EvalError::MissingField { path: "warp".into() }.to_string(),
            "record has no field 'warp'"
        );
    }
}
