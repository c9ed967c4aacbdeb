use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::error::SchemaError;
use super::kind::ValueKind;
use super::schema::Schema;

/// Words with a meaning of their own in the render format. A field path
/// segment may not spell one of them, in any letter case.
const RESERVED: &[&str] = &[
    "AND",
    "OR",
    "NOT",
    "ANY",
    "SOME",
    "ALL",
    "NONE",
    "IN",
    "LIKE",
    "BETWEEN",
    "BEGINSWITH",
    "ENDSWITH",
    "CONTAINS",
    "SELF",
    "NIL",
    "NULL",
    "TRUE",
    "FALSE",
    "YES",
    "NO",
    "TRUEPREDICATE",
    "FALSEPREDICATE",
];

/// Declared shape of a single schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub path: String,
    pub kind: ValueKind,
    pub nullable: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ValueKind, nullable: bool) -> Self {
        Self {
            path: path.into(),
            kind,
            nullable,
        }
    }
}

/// Maps field paths (e.g. `"captain.name"`) to their descriptors, in
/// declaration order.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    entity: &'static str,
    paths: HashMap<String, usize>,
    descriptors: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            paths: HashMap::new(),
            descriptors: Vec::new(),
        }
    }

    /// Build and validate the registry declared by `S::fields()`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for malformed, reserved or duplicate paths.
    pub fn of<S: Schema>() -> Result<Self, SchemaError> {
        let mut registry = Self::new(S::ENTITY);
        for descriptor in S::fields() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Register a descriptor, returning its index.
    pub(crate) fn register(&mut self, descriptor: FieldDescriptor) -> Result<usize, SchemaError> {
        validate_path(self.entity, &descriptor.path)?;
        if self.paths.contains_key(&descriptor.path) {
            return Err(SchemaError::DuplicateField {
                schema: self.entity,
                path: descriptor.path,
            });
        }
        let idx = self.descriptors.len();
        self.paths.insert(descriptor.path.clone(), idx);
        self.descriptors.push(descriptor);
        Ok(idx)
    }

    /// Look up the descriptor for a field path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldDescriptor> {
        self.paths.get(path).map(|&idx| &self.descriptors[idx])
    }

    /// The schema this registry describes.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// The number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate over all descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.descriptors.iter()
    }
}

/// Why a field path cannot be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathFault {
    Empty,
    EmptySegment,
    BadStart,
    BadChar,
    /// Byte range of the segment that spells a reserved word.
    Reserved(usize, usize),
}

impl PathFault {
    const fn reason(self) -> &'static str {
        match self {
            Self::Empty => "path is empty",
            Self::EmptySegment => "path has an empty segment",
            Self::BadStart => "segment must start with a letter or '_'",
            Self::BadChar => "segment may only contain letters, digits and '_'",
            Self::Reserved(..) => "segment is a reserved word",
        }
    }
}

/// Check a dotted field path. Usable in const context so that typed field
/// constants are rejected at compile time.
pub(crate) const fn check_path(path: &str) -> Result<(), PathFault> {
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        return Err(PathFault::Empty);
    }
    let mut start = 0;
    while start <= bytes.len() {
        let mut end = start;
        while end < bytes.len() && bytes[end] != b'.' {
            end += 1;
        }
        if end == start {
            return Err(PathFault::EmptySegment);
        }
        let first = bytes[start];
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return Err(PathFault::BadStart);
        }
        let mut i = start + 1;
        while i < end {
            if !(bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                return Err(PathFault::BadChar);
            }
            i += 1;
        }
        if is_reserved(bytes, start, end) {
            return Err(PathFault::Reserved(start, end));
        }
        start = end + 1;
    }
    Ok(())
}

const fn is_reserved(bytes: &[u8], start: usize, end: usize) -> bool {
    let mut w = 0;
    while w < RESERVED.len() {
        let word = RESERVED[w].as_bytes();
        if word.len() == end - start {
            let mut i = 0;
            while i < word.len() && bytes[start + i].eq_ignore_ascii_case(&word[i]) {
                i += 1;
            }
            if i == word.len() {
                return true;
            }
        }
        w += 1;
    }
    false
}

/// Panics when `path` is not a declarable field path. In a `const` item the
/// panic is a compile error.
pub(crate) const fn assert_path(path: &str) {
    match check_path(path) {
        Ok(()) => {}
        Err(PathFault::Empty) => panic!("invalid field path: path is empty"),
        Err(PathFault::EmptySegment) => panic!("invalid field path: empty segment"),
        Err(PathFault::BadStart) => {
            panic!("invalid field path: segment must start with a letter or '_'")
        }
        Err(PathFault::BadChar) => {
            panic!("invalid field path: segment may only contain letters, digits and '_'")
        }
        Err(PathFault::Reserved(..)) => panic!("invalid field path: segment is a reserved word"),
    }
}

fn validate_path(schema: &'static str, path: &str) -> Result<(), SchemaError> {
    match check_path(path) {
        Ok(()) => Ok(()),
        Err(PathFault::Reserved(start, end)) => Err(SchemaError::ReservedWord {
            schema,
            path: path.to_owned(),
            word: path[start..end].to_owned(),
        }),
        Err(fault) => Err(SchemaError::InvalidPath {
            schema,
            path: path.to_owned(),
            reason: fault.reason(),
        }),
    }
}

type RegistryCache = RwLock<HashMap<TypeId, Arc<FieldRegistry>>>;

static REGISTRIES: OnceLock<RegistryCache> = OnceLock::new();

/// The validated registry for `S`, built on first use and shared afterwards.
///
/// # Errors
///
/// Returns [`SchemaError`] if the schema's field declaration is invalid.
/// Failures are not cached.
pub fn registry<S: Schema>() -> Result<Arc<FieldRegistry>, SchemaError> {
    let cache = REGISTRIES.get_or_init(RegistryCache::default);
    let key = TypeId::of::<S>();
    if let Some(existing) = cache.read().get(&key) {
        return Ok(Arc::clone(existing));
    }

    let built = Arc::new(FieldRegistry::of::<S>()?);
    let mut guard = cache.write();
    let entry = guard.entry(key).or_insert_with(|| {
        tracing::debug!(
            schema = S::ENTITY,
            fields = built.len(),
            "field registry initialized"
        );
        Arc::clone(&built)
    });
    Ok(Arc::clone(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &str) -> FieldDescriptor {
        FieldDescriptor::new(path, ValueKind::Int, false)
    }

    #[test]
    fn register_and_get() {
        let mut reg = FieldRegistry::new("Ship");
        let idx = reg.register(descriptor("cost")).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(reg.get("cost").map(|d| &d.kind), Some(&ValueKind::Int));
    }

    #[test]
    fn duplicate_register_is_rejected() {
        let mut reg = FieldRegistry::new("Ship");
        reg.register(descriptor("cost")).unwrap();
        let err = reg.register(descriptor("cost")).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { path, .. } if path == "cost"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn multiple_fields_keep_declaration_order() {
        let mut reg = FieldRegistry::new("Ship");
        reg.register(descriptor("cost")).unwrap();
        reg.register(descriptor("captain.age")).unwrap();
        reg.register(descriptor("crew")).unwrap();
        let paths: Vec<&str> = reg.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["cost", "captain.age", "crew"]);
    }

    #[test]
    fn get_missing_returns_none() {
        let reg = FieldRegistry::new("Ship");
        assert_eq!(reg.get("nonexistent"), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for path in ["", "cost.", ".cost", "1cost", "co st", "cost-total"] {
            let mut reg = FieldRegistry::new("Ship");
            let err = reg.register(descriptor(path)).unwrap_err();
            assert!(
                matches!(err, SchemaError::InvalidPath { .. }),
                "expected invalid path for {path:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn reserved_words_are_rejected() {
        for path in ["and", "captain.SELF", "Between"] {
            let mut reg = FieldRegistry::new("Ship");
            let err = reg.register(descriptor(path)).unwrap_err();
            assert!(
                matches!(err, SchemaError::ReservedWord { .. }),
                "expected reserved word for {path:?}, got {err:?}"
            );
        }
    }

    const _: () = assert_path("captain.name");

    #[test]
    fn const_check_matches_registration() {
        for path in ["cost", "captain.name", "", "a..b", "9lives", "x-y", "NOT", "crew.Any"] {
            let mut reg = FieldRegistry::new("Ship");
            assert_eq!(
                check_path(path).is_ok(),
                reg.register(descriptor(path)).is_ok(),
                "disagreement on {path:?}"
            );
        }
        assert_eq!(check_path("crew.Any"), Err(PathFault::Reserved(5, 8)));
    }
}
