use crate::{model::spec::TableSpec, value::Value};

///
/// FieldValues
///
/// Runtime field access by name. Implemented per record; drives the
/// "value present" tests in selective templates and entity-driven binding.
///

pub trait FieldValues {
    /// Return the current value of `field`, or `None` when the field does
    /// not exist on this record. A present-but-null field returns
    /// `Some(Value::Null)`.
    fn value(&self, field: &str) -> Option<Value>;
}

///
/// Record
///
/// Entity boundary: a const table descriptor plus runtime field access.
/// The descriptor is the sole input to metadata derivation, so metadata is
/// a pure function of the declared shape and safe to cache forever.
///

pub trait Record: FieldValues {
    const SPEC: &'static TableSpec;

    /// Stable entity path used as the metadata and template cache key.
    #[must_use]
    fn path() -> &'static str {
        Self::SPEC.path
    }
}
