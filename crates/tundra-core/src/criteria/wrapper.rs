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
/// Wrapper
///
/// Fluent descriptor flavor: consuming-`self` chaining with conditional
/// gates, terminated by `build()` which hands an immutable snapshot to
/// the assembler. The builder owns its accumulated state exclusively —
/// no aliasing across call sites.
///
/// Gated variants (`*_if`) are no-ops when the gate is false and never
/// invoke the value supplier, enabling declarative "include this
/// predicate only if present" composition without call-site branching.
///

#[must_use]
#[derive(Debug)]
pub struct Wrapper<E: Record> {
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

impl<E: Record> Default for Wrapper<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> Wrapper<E> {
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

    /// Start a new AND-group OR'd with the previous ones; subsequent
    /// predicate calls apply to the new group.
    pub fn or(mut self) -> Self {
        self.groups.push(Group::new());
        self
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    pub fn eq(self, field: impl IntoField, value: impl FieldValue) -> Self {
        self.single(field, CompareOp::Eq, value)
    }

    pub fn ne(self, field: impl IntoField, value: impl FieldValue) -> Self {
        self.single(field, CompareOp::Ne, value)
    }

    pub fn gt(self, field: impl IntoField, value: impl FieldValue) -> Self {
        self.single(field, CompareOp::Gt, value)
    }

    pub fn lt(self, field: impl IntoField, value: impl FieldValue) -> Self {
        self.single(field, CompareOp::Lt, value)
    }

    pub fn ge(self, field: impl IntoField, value: impl FieldValue) -> Self {
        self.single(field, CompareOp::Ge, value)
    }

    pub fn le(self, field: impl IntoField, value: impl FieldValue) -> Self {
        self.single(field, CompareOp::Le, value)
    }

    pub fn like(self, field: impl IntoField, pattern: impl Into<String>) -> Self {
        self.single(field, CompareOp::Like, Value::Text(pattern.into()))
    }

    pub fn not_like(self, field: impl IntoField, pattern: impl Into<String>) -> Self {
        self.single(field, CompareOp::NotLike, Value::Text(pattern.into()))
    }

    pub fn like_prefix(self, field: impl IntoField, value: impl Into<String>) -> Self {
        self.single(field, CompareOp::Like, Value::Text(format!("{}%", value.into())))
    }

    pub fn like_suffix(self, field: impl IntoField, value: impl Into<String>) -> Self {
        self.single(field, CompareOp::Like, Value::Text(format!("%{}", value.into())))
    }

    pub fn like_contains(self, field: impl IntoField, value: impl Into<String>) -> Self {
        self.single(field, CompareOp::Like, Value::Text(format!("%{}%", value.into())))
    }

    pub fn is_null(mut self, field: impl IntoField) -> Self {
        let fault = &mut self.fault;
        push_null_check::<E>(current_of(&mut self.groups), fault, field, false);
        self
    }

    pub fn is_not_null(mut self, field: impl IntoField) -> Self {
        let fault = &mut self.fault;
        push_null_check::<E>(current_of(&mut self.groups), fault, field, true);
        self
    }

    pub fn in_list<V: FieldValue>(
        mut self,
        field: impl IntoField,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        let fault = &mut self.fault;
        push_list::<E>(current_of(&mut self.groups), fault, field, ListOp::In, values);
        self
    }

    pub fn not_in<V: FieldValue>(
        mut self,
        field: impl IntoField,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        let fault = &mut self.fault;
        push_list::<E>(
            current_of(&mut self.groups),
            fault,
            field,
            ListOp::NotIn,
            values,
        );
        self
    }

    pub fn between(
        mut self,
        field: impl IntoField,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> Self {
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
        mut self,
        field: impl IntoField,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> Self {
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

    pub fn raw(mut self, condition: impl Into<String>) -> Self {
        current_of(&mut self.groups).push(Criterion::raw(condition));
        self
    }

    pub fn nested_or(mut self, branches: impl IntoIterator<Item = Clause<E>>) -> Self {
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

    pub fn eq_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> Self {
        if gate { self.eq(field, value()) } else { self }
    }

    pub fn ne_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> Self {
        if gate { self.ne(field, value()) } else { self }
    }

    pub fn gt_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> Self {
        if gate { self.gt(field, value()) } else { self }
    }

    pub fn ge_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> Self {
        if gate { self.ge(field, value()) } else { self }
    }

    pub fn lt_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> Self {
        if gate { self.lt(field, value()) } else { self }
    }

    pub fn le_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        value: impl FnOnce() -> V,
    ) -> Self {
        if gate { self.le(field, value()) } else { self }
    }

    pub fn like_if(
        self,
        gate: bool,
        field: impl IntoField,
        pattern: impl FnOnce() -> String,
    ) -> Self {
        if gate { self.like(field, pattern()) } else { self }
    }

    pub fn in_list_if<V: FieldValue, I: IntoIterator<Item = V>>(
        self,
        gate: bool,
        field: impl IntoField,
        values: impl FnOnce() -> I,
    ) -> Self {
        if gate { self.in_list(field, values()) } else { self }
    }

    pub fn between_if<V: FieldValue>(
        self,
        gate: bool,
        field: impl IntoField,
        bounds: impl FnOnce() -> (V, V),
    ) -> Self {
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

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub const fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Append an ordering key; accumulative, never silently overwritten.
    pub fn order_by(mut self, field: impl IntoField, direction: OrderDirection) -> Self {
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

    pub fn reset_order(mut self) -> Self {
        self.order_by = None;
        self
    }

    pub fn prefix_sql(mut self, sql: impl Into<String>) -> Self {
        self.prefix_sql = Some(sql.into());
        self
    }

    pub fn suffix_sql(mut self, sql: impl Into<String>) -> Self {
        self.suffix_sql = Some(sql.into());
        self
    }

    // ------------------------------------------------------------------
    // Update assignments
    // ------------------------------------------------------------------

    /// Append a SET pair for a criteria-driven update.
    ///
    /// Duplicate columns are not deduplicated: pairs render in call order
    /// and the first present pair per column wins. Avoid setting the same
    /// column twice unless that order dependence is intended.
    pub fn set(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
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

    pub fn set_raw(mut self, sql: impl Into<String>) -> Self {
        self.assignments.push(Assignment::Raw(sql.into()));
        self
    }

    /// Permit null SET values to render as bound NULLs instead of
    /// raising a guard violation.
    pub const fn allow_nullable_update(mut self, allow: bool) -> Self {
        self.allow_nullable_update = allow;
        self
    }

    // ------------------------------------------------------------------
    // Terminal
    // ------------------------------------------------------------------

    /// Finalize into an immutable snapshot for the assembler.
    #[must_use]
    pub fn build(self) -> CriteriaTree {
        CriteriaTree {
            groups: self.groups,
            assignments: self.assignments,
            select: self.select,
            distinct: self.distinct,
            order_by: self.order_by,
            prefix_sql: self.prefix_sql,
            suffix_sql: self.suffix_sql,
            allow_nullable_update: self.allow_nullable_update,
            fault: self.fault,
        }
    }

    fn single(mut self, field: impl IntoField, op: CompareOp, value: impl FieldValue) -> Self {
        let fault = &mut self.fault;
        push_single::<E>(current_of(&mut self.groups), fault, field, op, value);
        self
    }
}
