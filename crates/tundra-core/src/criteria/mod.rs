//! Module: criteria
//! Responsibility: the mutable query/update descriptors (fixed-shape and
//! fluent flavors) and the immutable tree snapshot they hand to the
//! assembler.
//! Does not own: SQL text generation; the tree is pure data.

pub mod clause;
pub mod criterion;
pub mod query;
pub mod tree;
pub mod wrapper;


// re-exports
pub use clause::Clause;
pub use criterion::{CompareOp, Criterion, Group, ListOp, RangeOp};
pub use query::Query;
pub use tree::{Assignment, CriteriaTree};
pub use wrapper::Wrapper;

use crate::{
    resolve::{IntoField, ResolveError},
    traits::Record,
    value::FieldValue,
};
use thiserror::Error as ThisError;

///
/// CriteriaError
///
/// Guard violations raised by criteria construction or assembly. Carried
/// with enough context (column, operator, table, operation) to act on
/// without inspecting generated SQL.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CriteriaError {
    #[error("null value for predicate '{column} {operator}'")]
    NullValue { column: String, operator: String },

    #[error("empty value list for predicate '{column} {operator}'")]
    EmptyList { column: String, operator: String },

    #[error(
        "empty criteria refused for '{operation}' on table '{table}' (allow_empty_criteria=false)"
    )]
    EmptyCriteriaForbidden { table: String, operation: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

// ----------------------------------------------------------------------
// Shared grammar internals
//
// Both flavors and the nested-or clause funnel through these helpers so
// resolution, null guards, and fault latching behave identically. The
// first fault wins; later calls on a faulted builder are no-ops and the
// fault surfaces at assembly time.
// ----------------------------------------------------------------------

/// Current AND-group of an OR-list, creating the first group on demand.
pub(crate) fn current_of(groups: &mut Vec<Group>) -> &mut Group {
    if groups.is_empty() {
        groups.push(Group::new());
    }
    groups.last_mut().expect("group exists by construction")
}

pub(crate) fn push_single<E: Record>(
    group: &mut Group,
    fault: &mut Option<CriteriaError>,
    field: impl IntoField,
    op: CompareOp,
    value: impl FieldValue,
) {
    if fault.is_some() {
        return;
    }
    match field
        .resolve_on::<E>()
        .map_err(CriteriaError::from)
        .and_then(|column| Criterion::single(&column.name, op, value.to_value()))
    {
        Ok(criterion) => group.push(criterion),
        Err(err) => *fault = Some(err),
    }
}

pub(crate) fn push_list<E: Record>(
    group: &mut Group,
    fault: &mut Option<CriteriaError>,
    field: impl IntoField,
    op: ListOp,
    values: Vec<crate::value::Value>,
) {
    if fault.is_some() {
        return;
    }
    match field
        .resolve_on::<E>()
        .map_err(CriteriaError::from)
        .and_then(|column| Criterion::list(&column.name, op, values))
    {
        Ok(criterion) => group.push(criterion),
        Err(err) => *fault = Some(err),
    }
}

pub(crate) fn push_range<E: Record>(
    group: &mut Group,
    fault: &mut Option<CriteriaError>,
    field: impl IntoField,
    op: RangeOp,
    low: impl FieldValue,
    high: impl FieldValue,
) {
    if fault.is_some() {
        return;
    }
    match field
        .resolve_on::<E>()
        .map_err(CriteriaError::from)
        .and_then(|column| Criterion::range(&column.name, op, low.to_value(), high.to_value()))
    {
        Ok(criterion) => group.push(criterion),
        Err(err) => *fault = Some(err),
    }
}

pub(crate) fn push_null_check<E: Record>(
    group: &mut Group,
    fault: &mut Option<CriteriaError>,
    field: impl IntoField,
    negated: bool,
) {
    if fault.is_some() {
        return;
    }
    match field.resolve_on::<E>() {
        Ok(column) => {
            let test = if negated { "IS NOT NULL" } else { "IS NULL" };
            group.push(Criterion::raw(format!("{} {test}", column.name)));
        }
        Err(err) => *fault = Some(err.into()),
    }
}
