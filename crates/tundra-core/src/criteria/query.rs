use crate::{
    criteria::{
        Clause, CompareOp, CriteriaError, ListOp, RangeOp,
        criterion::{Criterion, Group},
        current_of, push_list, push_null_check, push_range, push_single,
        tree::{Assignment, CriteriaTree},
    },
    model::OrderDirection,
    resolve::IntoField,
    traits::Record,
    value::{FieldValue, Value},
};
use std::marker::PhantomData;

///
/// Query
///
/// Fixed-shape descriptor flavor: the caller owns a reusable query object,
/// starts AND-groups explicitly, and takes snapshots for execution.
///
/// Grouping rules:
/// - `group()` starts an AND-group; the first group created becomes the
///   sole OR member.
/// - `or()` starts a new AND-group appended to the OR-list.
/// - Predicate calls apply to the current group, creating the first group
///   on demand.
///
/// Not thread-safe by design; build and consume within one call's scope.
///

#[derive(Debug)]
pub struct Query<E: Record> {
    groups: Vec<Group>,
    assignments: Vec<Assignment>,
    select: Option<String>,
    distinct: bool,
    order_by: Option<String>,
    prefix_sql: Option<String>,
    suffix_sql: Option<String>,
    allow_nullable_update: bool,
    fault: Option<CriteriaError>,
    _marker: PhantomData<E>,
}

impl<E: Record> Default for Query<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> Query<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: Vec::new(),
            assignments: Vec::new(),
            select: None,
            distinct: false,
            order_by: None,
            prefix_sql: None,
            suffix_sql: None,
            allow_nullable_update: false,
            fault: None,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Start an AND-group explicitly.
    pub fn group(&mut self) -> &mut Self {
        self.groups.push(Group::new());
        self
    }

    /// Start a new AND-group OR'd with the previous ones.
    pub fn or(&mut self) -> &mut Self {
        self.groups.push(Group::new());
        self
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    pub fn eq(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        self.single(field, CompareOp::Eq, value)
    }

    pub fn ne(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        self.single(field, CompareOp::Ne, value)
    }

    pub fn gt(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        self.single(field, CompareOp::Gt, value)
    }

    pub fn lt(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        self.single(field, CompareOp::Lt, value)
    }

    pub fn ge(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        self.single(field, CompareOp::Ge, value)
    }

    pub fn le(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        self.single(field, CompareOp::Le, value)
    }

    pub fn like(&mut self, field: impl IntoField, pattern: impl Into<String>) -> &mut Self {
        self.single(field, CompareOp::Like, Value::Text(pattern.into()))
    }

    pub fn not_like(&mut self, field: impl IntoField, pattern: impl Into<String>) -> &mut Self {
        self.single(field, CompareOp::NotLike, Value::Text(pattern.into()))
    }

    /// `LIKE 'value%'`
    pub fn like_prefix(&mut self, field: impl IntoField, value: impl Into<String>) -> &mut Self {
        self.single(field, CompareOp::Like, Value::Text(format!("{}%", value.into())))
    }

    /// `LIKE '%value'`
    pub fn like_suffix(&mut self, field: impl IntoField, value: impl Into<String>) -> &mut Self {
        self.single(field, CompareOp::Like, Value::Text(format!("%{}", value.into())))
    }

    /// `LIKE '%value%'`
    pub fn like_contains(&mut self, field: impl IntoField, value: impl Into<String>) -> &mut Self {
        self.single(field, CompareOp::Like, Value::Text(format!("%{}%", value.into())))
    }

    pub fn is_null(&mut self, field: impl IntoField) -> &mut Self {
        let fault = &mut self.fault;
        push_null_check::<E>(current_of(&mut self.groups), fault, field, false);
        self
    }

    pub fn is_not_null(&mut self, field: impl IntoField) -> &mut Self {
        let fault = &mut self.fault;
        push_null_check::<E>(current_of(&mut self.groups), fault, field, true);
        self
    }

    pub fn in_list<V: FieldValue>(
        &mut self,
        field: impl IntoField,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.list(field, ListOp::In, values)
    }

    pub fn not_in<V: FieldValue>(
        &mut self,
        field: impl IntoField,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.list(field, ListOp::NotIn, values)
    }

    pub fn between(
        &mut self,
        field: impl IntoField,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> &mut Self {
        let fault = &mut self.fault;
        push_range::<E>(
            current_of(&mut self.groups),
            fault,
            field,
            RangeOp::Between,
            low,
            high,
        );
        self
    }

    pub fn not_between(
        &mut self,
        field: impl IntoField,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> &mut Self {
        let fault = &mut self.fault;
        push_range::<E>(
            current_of(&mut self.groups),
            fault,
            field,
            RangeOp::NotBetween,
            low,
            high,
        );
        self
    }

    /// Append a raw boolean condition verbatim.
    pub fn raw(&mut self, condition: impl Into<String>) -> &mut Self {
        current_of(&mut self.groups).push(Criterion::raw(condition));
        self
    }

    /// Append one or-group criterion to the current AND-group, enabling
    /// `a AND (b OR c)` shapes.
    pub fn nested_or(&mut self, branches: impl IntoIterator<Item = Clause<E>>) -> &mut Self {
        let mut groups = Vec::new();
        for branch in branches {
            let (group, fault) = branch.into_parts();
            if let Some(err) = fault
                && self.fault.is_none()
            {
                self.fault = Some(err);
            }
            groups.push(group);
        }
        current_of(&mut self.groups).push(Criterion::or_group(groups));
        self
    }

    // ------------------------------------------------------------------
    // Conditional gates
    // ------------------------------------------------------------------

    // A false gate is a no-op and never invokes the value supplier.

    pub fn eq_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> &mut Self {
        if gate { self.eq(field, value()) } else { self }
    }

    pub fn ne_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> &mut Self {
        if gate { self.ne(field, value()) } else { self }
    }

    pub fn gt_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> &mut Self {
        if gate { self.gt(field, value()) } else { self }
    }

    pub fn ge_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> &mut Self {
        if gate { self.ge(field, value()) } else { self }
    }

    pub fn lt_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> &mut Self {
        if gate { self.lt(field, value()) } else { self }
    }

    pub fn le_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> &mut Self {
        if gate { self.le(field, value()) } else { self }
    }

    pub fn like_if(
        &mut self,
        gate: bool,
        field: impl IntoField,
        pattern: impl FnOnce() -> String,
    ) -> &mut Self {
        if gate { self.like(field, pattern()) } else { self }
    }

    pub fn in_list_if<V: FieldValue, I: IntoIterator<Item = V>>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        values: impl FnOnce() -> I,
    ) -> &mut Self {
        if gate { self.in_list(field, values()) } else { self }
    }

    pub fn between_if<V: FieldValue>(
        &mut self,
        gate: bool,
        field: impl IntoField,
        bounds: impl FnOnce() -> (V, V),
    ) -> &mut Self {
        if gate {
            let (low, high) = bounds();
            self.between(field, low, high)
        } else {
            self
        }
    }

    // ------------------------------------------------------------------
    // Projection, ordering, raw SQL
    // ------------------------------------------------------------------

    /// Override the SELECT column list verbatim.
    pub fn select(&mut self, columns: impl Into<String>) -> &mut Self {
        self.select = Some(columns.into());
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self
    }

    /// Append an ordering key; accumulative, never silently overwritten.
    pub fn order_by(&mut self, field: impl IntoField, direction: OrderDirection) -> &mut Self {
        match field.resolve_on::<E>() {
            Ok(column) => {
                let term = format!("{} {}", column.name, direction.as_sql());
                self.order_by = Some(match self.order_by.take() {
                    Some(existing) => format!("{existing}, {term}"),
                    None => term,
                });
            }
            Err(err) => {
                if self.fault.is_none() {
                    self.fault = Some(err.into());
                }
            }
        }
        self
    }

    /// Discard any accumulated ordering.
    pub fn reset_order(&mut self) -> &mut Self {
        self.order_by = None;
        self
    }

    pub fn prefix_sql(&mut self, sql: impl Into<String>) -> &mut Self {
        self.prefix_sql = Some(sql.into());
        self
    }

    pub fn suffix_sql(&mut self, sql: impl Into<String>) -> &mut Self {
        self.suffix_sql = Some(sql.into());
        self
    }

    // ------------------------------------------------------------------
    // Update assignments
    // ------------------------------------------------------------------

    /// Append a SET pair. Duplicates are kept; see `Assignment`.
    pub fn set(&mut self, field: impl IntoField, value: impl FieldValue) -> &mut Self {
        match field.resolve_on::<E>() {
            Ok(column) => self.assignments.push(Assignment::Pair {
                column: column.name.clone(),
                value: value.to_value(),
            }),
            Err(err) => {
                if self.fault.is_none() {
                    self.fault = Some(err.into());
                }
            }
        }
        self
    }

    /// Append a raw SET fragment (e.g. `counter = counter + 1`).
    pub fn set_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.assignments.push(Assignment::Raw(sql.into()));
        self
    }

    /// Permit null SET values to render as bound NULLs instead of
    /// raising a guard violation.
    pub fn allow_nullable_update(&mut self, allow: bool) -> &mut Self {
        self.allow_nullable_update = allow;
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Reset every field to its construction default for reuse.
    pub fn clear(&mut self) -> &mut Self {
        self.groups.clear();
        self.assignments.clear();
        self.select = None;
        self.distinct = false;
        self.order_by = None;
        self.prefix_sql = None;
        self.suffix_sql = None;
        self.allow_nullable_update = false;
        self.fault = None;
        self
    }

    /// Take an immutable snapshot for the assembler; the query object
    /// remains usable (and reusable via `clear`).
    #[must_use]
    pub fn snapshot(&self) -> CriteriaTree {
        CriteriaTree {
            groups: self.groups.clone(),
            assignments: self.assignments.clone(),
            select: self.select.clone(),
            distinct: self.distinct,
            order_by: self.order_by.clone(),
            prefix_sql: self.prefix_sql.clone(),
            suffix_sql: self.suffix_sql.clone(),
            allow_nullable_update: self.allow_nullable_update,
            fault: self.fault.clone(),
        }
    }

    fn single(
        &mut self,
        field: impl IntoField,
        op: CompareOp,
        value: impl FieldValue,
    ) -> &mut Self {
        let fault = &mut self.fault;
        push_single::<E>(current_of(&mut self.groups), fault, field, op, value);
        self
    }

    fn list<V: FieldValue>(
        &mut self,
        field: impl IntoField,
        op: ListOp,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        let fault = &mut self.fault;
        push_list::<E>(current_of(&mut self.groups), fault, field, op, values);
        self
    }
}
