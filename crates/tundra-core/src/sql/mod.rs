//! Module: sql
//! Responsibility: the template assembler — per-operation SQL templates
//! built once per (entity, operation) and rendered against runtime input.
//! Does not own: statement execution or result materialization.

pub mod cache;
pub mod node;
pub mod ops;
pub mod render;
pub mod soft_delete;
pub mod templates;
pub(crate) mod where_clause;

#[cfg(test)]
mod tests;

// re-exports
pub use node::{Fragment, SqlTemplate, Test};
pub use ops::template_for;
pub use render::{BindInput, render};

use crate::{criteria::CriteriaError, model::MetaError, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// OperationKind
///
/// Stable operation identity: together with the entity path it keys the
/// template cache, independent of any runtime argument values.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum OperationKind {
    Insert,
    InsertSelective,
    UpdateByKey,
    UpdateByKeySelective,
    UpdateByCriteria,
    UpdateByCriteriaSelective,
    DeleteByKey,
    DeleteByCriteria,
    DeleteByEntity,
    SelectByKey,
    SelectByCriteria,
    SelectOneByCriteria,
    SelectByEntity,
    CountByCriteria,
    CountByEntity,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::InsertSelective => "insert_selective",
            Self::UpdateByKey => "update_by_key",
            Self::UpdateByKeySelective => "update_by_key_selective",
            Self::UpdateByCriteria => "update_by_criteria",
            Self::UpdateByCriteriaSelective => "update_by_criteria_selective",
            Self::DeleteByKey => "delete_by_key",
            Self::DeleteByCriteria => "delete_by_criteria",
            Self::DeleteByEntity => "delete_by_entity",
            Self::SelectByKey => "select_by_key",
            Self::SelectByCriteria => "select_by_criteria",
            Self::SelectOneByCriteria => "select_one_by_criteria",
            Self::SelectByEntity => "select_by_entity",
            Self::CountByCriteria => "count_by_criteria",
            Self::CountByEntity => "count_by_entity",
        }
    }

    /// Criteria-driven mutations are subject to the empty-criteria guard.
    #[must_use]
    pub const fn is_criteria_mutation(self) -> bool {
        matches!(
            self,
            Self::UpdateByCriteria | Self::UpdateByCriteriaSelective | Self::DeleteByCriteria
        )
    }

    /// Selective variants gate inclusion on "runtime value present".
    #[must_use]
    pub const fn is_selective(self) -> bool {
        matches!(
            self,
            Self::InsertSelective | Self::UpdateByKeySelective | Self::UpdateByCriteriaSelective
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// SqlStatement
///
/// Rendered output: parameterized SQL plus bound values in placeholder
/// order. Handed to the statement executor; the core performs no I/O.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

///
/// TemplateError
///
/// Failures raised while building or rendering a template. Configuration
/// and guard causes compose in from their owning modules.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TemplateError {
    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error("operation '{operation}' requires a record")]
    MissingRecord { operation: String },

    #[error("operation '{operation}' requires a criteria tree")]
    MissingCriteria { operation: String },

    #[error("operation '{operation}' requires key values")]
    MissingKey { operation: String },

    #[error("operation '{operation}' expected {expected} key value(s), found {found}")]
    KeyArity {
        operation: String,
        expected: usize,
        found: usize,
    },

    #[error("operation '{operation}' on table '{table}' produced no columns to write")]
    EmptyWriteSet { table: String, operation: String },
}
