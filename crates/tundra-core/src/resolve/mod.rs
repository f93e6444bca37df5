//! Module: resolve
//! Responsibility: mapping typed field accessors (generated constants) to
//! column metadata, with two-level memoization.
//! Does not own: metadata derivation or criteria semantics.

use crate::{
    model::{Column, MetaError, metadata_for},
    traits::Record,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, OnceLock},
};
use thiserror::Error as ThisError;


///
/// FieldAccessor
///
/// Zero-cost accessor token: the owning type path plus the accessor
/// method name, emitted as a generated constant per getter. Replaces the
/// runtime introspection of dynamic environments; decoding here is just
/// prefix stripping, but the result is still memoized so the decode cost
/// is paid once per accessor regardless of how many targets reuse it.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FieldAccessor {
    owner: &'static str,
    method: &'static str,
}

impl FieldAccessor {
    #[must_use]
    pub const fn new(owner: &'static str, method: &'static str) -> Self {
        Self { owner, method }
    }

    #[must_use]
    pub const fn owner(self) -> &'static str {
        self.owner
    }

    #[must_use]
    pub const fn method(self) -> &'static str {
        self.method
    }
}

///
/// ResolveError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolveError {
    #[error("field '{field}' is not mapped on entity '{entity}'")]
    NotMapped { entity: String, field: String },

    #[error(transparent)]
    Meta(#[from] MetaError),
}

// Level one: accessor identity -> decoded field name. Decoding is the
// expensive step in the source system and its result is reusable across
// target entity types, so it is cached separately from column lookup.
static DECODED: OnceLock<Mutex<BTreeMap<FieldAccessor, &'static str>>> = OnceLock::new();

// Level two: (accessor, target entity path) -> column. Value-immutable
// once computed; first insert wins.
static COLUMNS: OnceLock<Mutex<BTreeMap<(FieldAccessor, &'static str), Arc<Column>>>> =
    OnceLock::new();

/// Resolve an accessor against its own declaring type.
pub fn column_for<E: Record>(accessor: FieldAccessor) -> Result<Arc<Column>, ResolveError> {
    column_for_target::<E>(accessor)
}

/// Resolve an accessor against an explicit target type.
///
/// Needed when the accessor is declared on a shared base type and the
/// concrete subtype's table must be consulted; `E` is the target, which
/// may differ from `accessor.owner()`.
pub fn column_for_target<E: Record>(accessor: FieldAccessor) -> Result<Arc<Column>, ResolveError> {
    let cache = COLUMNS.get_or_init(|| Mutex::new(BTreeMap::new()));
    let key = (accessor, E::path());

    if let Some(column) = cache
        .lock()
        .expect("resolver column cache lock poisoned")
        .get(&key)
    {
        return Ok(column.clone());
    }

    let field = decode(accessor);
    let column = lookup::<E>(field)?;

    let mut guard = cache.lock().expect("resolver column cache lock poisoned");
    Ok(guard.entry(key).or_insert(column).clone())
}

/// Resolve from a bare field name, bypassing accessor decoding.
pub fn column_by_name<E: Record>(field: &str) -> Result<Arc<Column>, ResolveError> {
    lookup::<E>(field)
}

fn lookup<E: Record>(field: &str) -> Result<Arc<Column>, ResolveError> {
    let table = metadata_for::<E>()?;

    table
        .find_column(field)
        .cloned()
        .ok_or_else(|| ResolveError::NotMapped {
            entity: E::path().to_string(),
            field: field.to_string(),
        })
}

/// Decode an accessor method name to a field name, memoized per accessor.
///
/// `get_name` and `is_active` style prefixes are stripped; anything else
/// is taken verbatim as the field name.
fn decode(accessor: FieldAccessor) -> &'static str {
    let cache = DECODED.get_or_init(|| Mutex::new(BTreeMap::new()));

    if let Some(field) = cache
        .lock()
        .expect("resolver decode cache lock poisoned")
        .get(&accessor)
    {
        return field;
    }

    let field = strip_accessor_prefix(accessor.method);

    let mut guard = cache.lock().expect("resolver decode cache lock poisoned");
    *guard.entry(accessor).or_insert(field)
}

fn strip_accessor_prefix(method: &'static str) -> &'static str {
    method
        .strip_prefix("get_")
        .or_else(|| method.strip_prefix("is_"))
        .unwrap_or(method)
}

///
/// IntoField
///
/// Anything the criteria grammar accepts as a field designator: a bare
/// property name or a generated accessor constant.
///

pub trait IntoField {
    fn resolve_on<E: Record>(&self) -> Result<Arc<Column>, ResolveError>;
}

impl IntoField for &str {
    fn resolve_on<E: Record>(&self) -> Result<Arc<Column>, ResolveError> {
        column_by_name::<E>(self)
    }
}

impl IntoField for String {
    fn resolve_on<E: Record>(&self) -> Result<Arc<Column>, ResolveError> {
        column_by_name::<E>(self)
    }
}

impl IntoField for FieldAccessor {
    fn resolve_on<E: Record>(&self) -> Result<Arc<Column>, ResolveError> {
        column_for_target::<E>(*self)
    }
}

#[cfg(test)]
pub(crate) fn decode_cache_len() -> usize {
    DECODED
        .get()
        .map_or(0, |cache| cache.lock().expect("lock").len())
}
