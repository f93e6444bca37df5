use crate::value::Value;
use serde::{Deserialize, Serialize};

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

///
/// Column
///
/// Fully-derived runtime column metadata. Immutable once its owning
/// [`crate::model::Table`] is published; handed out as `Arc<Column>` so
/// resolver caches can share it without copying.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Physical column name as emitted into SQL.
    pub name: String,
    /// Logical field name as declared on the record.
    pub property: String,
    pub is_id: bool,
    pub selectable: bool,
    pub insertable: bool,
    pub updatable: bool,
    /// Default ordering contributed to SELECT templates.
    pub order_by: Option<OrderDirection>,
    /// Soft-delete marker; at most one per table (enforced at use time).
    pub delete_flag: Option<DeleteFlag>,
}

impl Column {
    /// Property match is case-sensitive; physical-name fallback is not.
    #[must_use]
    pub fn matches(&self, field: &str) -> bool {
        self.property == field || self.name.eq_ignore_ascii_case(field)
    }
}

///
/// DeleteFlag
///

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteFlag {
    pub mode: DeleteMode,
}

///
/// DeleteMode
///
/// Literal mode writes a fixed sentinel and filters with `<name> != <lit>`;
/// timestamp mode writes CURRENT_TIMESTAMP and filters with `IS NULL`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum DeleteMode {
    Literal(Value),
    CurrentTimestamp,
}
