use crate::{
    criteria::{
        CompareOp, CriteriaError, ListOp, RangeOp,
        criterion::{Criterion, Group},
        push_list, push_null_check, push_range, push_single,
    },
    resolve::IntoField,
    traits::Record,
    value::{FieldValue, Value},
};
use std::marker::PhantomData;

///
/// Clause
///
/// One AND-group under construction, used as a branch of `nested_or` in
/// either flavor. Same grammar, consuming-self chaining; the finished
/// group (and any latched fault) is absorbed by the parent builder.
///

#[must_use]
pub struct Clause<E: Record> {
    group: Group,
    fault: Option<CriteriaError>,
    _marker: PhantomData<E>,
}

impl<E: Record> Default for Clause<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> Clause<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            group: Group::new(),
            fault: None,
            _marker: PhantomData,
        }
    }

    pub fn eq(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
        push_single::<E>(&mut self.group, &mut self.fault, field, CompareOp::Eq, value);
        self
    }

    pub fn ne(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
        push_single::<E>(&mut self.group, &mut self.fault, field, CompareOp::Ne, value);
        self
    }

    pub fn gt(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
        push_single::<E>(&mut self.group, &mut self.fault, field, CompareOp::Gt, value);
        self
    }

    pub fn lt(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
        push_single::<E>(&mut self.group, &mut self.fault, field, CompareOp::Lt, value);
        self
    }

    pub fn ge(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
        push_single::<E>(&mut self.group, &mut self.fault, field, CompareOp::Ge, value);
        self
    }

    pub fn le(mut self, field: impl IntoField, value: impl FieldValue) -> Self {
        push_single::<E>(&mut self.group, &mut self.fault, field, CompareOp::Le, value);
        self
    }

    pub fn like(mut self, field: impl IntoField, pattern: impl Into<String>) -> Self {
        push_single::<E>(
            &mut self.group,
            &mut self.fault,
            field,
            CompareOp::Like,
            Value::Text(pattern.into()),
        );
        self
    }

    pub fn not_like(mut self, field: impl IntoField, pattern: impl Into<String>) -> Self {
        push_single::<E>(
            &mut self.group,
            &mut self.fault,
            field,
            CompareOp::NotLike,
            Value::Text(pattern.into()),
        );
        self
    }

    /// `LIKE 'value%'`
    pub fn like_prefix(self, field: impl IntoField, value: impl Into<String>) -> Self {
        self.like(field, format!("{}%", value.into()))
    }

    /// `LIKE '%value'`
    pub fn like_suffix(self, field: impl IntoField, value: impl Into<String>) -> Self {
        self.like(field, format!("%{}", value.into()))
    }

    /// `LIKE '%value%'`
    pub fn like_contains(self, field: impl IntoField, value: impl Into<String>) -> Self {
        self.like(field, format!("%{}%", value.into()))
    }

    pub fn is_null(mut self, field: impl IntoField) -> Self {
        push_null_check::<E>(&mut self.group, &mut self.fault, field, false);
        self
    }

    pub fn is_not_null(mut self, field: impl IntoField) -> Self {
        push_null_check::<E>(&mut self.group, &mut self.fault, field, true);
        self
    }

    pub fn in_list<V: FieldValue>(
        mut self,
        field: impl IntoField,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        push_list::<E>(&mut self.group, &mut self.fault, field, ListOp::In, values);
        self
    }

    pub fn not_in<V: FieldValue>(
        mut self,
        field: impl IntoField,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(|v| v.to_value()).collect();
        push_list::<E>(
            &mut self.group,
            &mut self.fault,
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
        push_range::<E>(
            &mut self.group,
            &mut self.fault,
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
        push_range::<E>(
            &mut self.group,
            &mut self.fault,
            field,
            RangeOp::NotBetween,
            low,
            high,
        );
        self
    }

    pub fn raw(mut self, condition: impl Into<String>) -> Self {
        self.group.push(Criterion::raw(condition));
        self
    }

    pub(crate) fn into_parts(self) -> (Group, Option<CriteriaError>) {
        (self.group, self.fault)
    }
}
