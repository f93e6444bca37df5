use crate::{criteria::CriteriaError, value::Value};
use derive_more::{Deref, DerefMut, IntoIterator};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
    NotLike,
}

impl CompareOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

///
/// ListOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListOp {
    In,
    NotIn,
}

impl ListOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }
}

///
/// RangeOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeOp {
    Between,
    NotBetween,
}

impl RangeOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
        }
    }
}

///
/// Criterion
///
/// One atomic predicate. The five kinds are mutually exclusive; value-
/// carrying kinds refuse null values at construction so a malformed
/// predicate can never reach the assembler.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Criterion {
    /// Raw boolean condition text; the column side comes from trusted
    /// metadata, never caller data.
    Raw { condition: String },

    /// `column OP ?`
    Single {
        column: String,
        op: CompareOp,
        value: Value,
    },

    /// `column [NOT] BETWEEN ? AND ?`
    Range {
        column: String,
        op: RangeOp,
        low: Value,
        high: Value,
    },

    /// `column [NOT] IN (?, …)` — one placeholder per element, input order.
    List {
        column: String,
        op: ListOp,
        values: Vec<Value>,
    },

    /// Nested alternatives: each group is an AND-list, the groups are
    /// OR-joined, the whole emitted as one parenthesized criterion.
    OrGroup { groups: Vec<Group> },
}

impl Criterion {
    #[must_use]
    pub fn raw(condition: impl Into<String>) -> Self {
        Self::Raw {
            condition: condition.into(),
        }
    }

    pub fn single(column: &str, op: CompareOp, value: Value) -> Result<Self, CriteriaError> {
        if value.is_null() {
            return Err(CriteriaError::NullValue {
                column: column.to_string(),
                operator: op.as_sql().to_string(),
            });
        }

        Ok(Self::Single {
            column: column.to_string(),
            op,
            value,
        })
    }

    pub fn range(
        column: &str,
        op: RangeOp,
        low: Value,
        high: Value,
    ) -> Result<Self, CriteriaError> {
        if low.is_null() || high.is_null() {
            return Err(CriteriaError::NullValue {
                column: column.to_string(),
                operator: op.as_sql().to_string(),
            });
        }

        Ok(Self::Range {
            column: column.to_string(),
            op,
            low,
            high,
        })
    }

    pub fn list(column: &str, op: ListOp, values: Vec<Value>) -> Result<Self, CriteriaError> {
        if values.is_empty() {
            return Err(CriteriaError::EmptyList {
                column: column.to_string(),
                operator: op.as_sql().to_string(),
            });
        }
        if values.iter().any(Value::is_null) {
            return Err(CriteriaError::NullValue {
                column: column.to_string(),
                operator: op.as_sql().to_string(),
            });
        }

        Ok(Self::List {
            column: column.to_string(),
            op,
            values,
        })
    }

    #[must_use]
    pub const fn or_group(groups: Vec<Group>) -> Self {
        Self::OrGroup { groups }
    }
}

///
/// Group
///
/// An AND-group: an ordered criterion list implicitly joined by AND.
/// Valid iff non-empty; invalid groups contribute nothing to the WHERE.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, IntoIterator, PartialEq)]
pub struct Group(Vec<Criterion>);

impl Group {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn push(&mut self, criterion: Criterion) {
        self.0.push(criterion);
    }
}
