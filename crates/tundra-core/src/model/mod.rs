//! Module: model
//! Responsibility: table/column metadata — const descriptors, the layered
//! derivation pipeline, and the process-lifetime registry.
//! Does not own: criteria construction or SQL assembly.

pub mod column;
pub mod factory;
pub mod registry;
pub mod spec;
pub mod table;


// re-exports
pub use column::{Column, DeleteFlag, DeleteMode, OrderDirection};
pub use factory::{MetaLayer, register_layer};
pub use registry::metadata_for;
pub use spec::{DeleteFlagSpec, FieldSpec, SpecValue, TableSpec};
pub use table::{
    PROP_ALLOW_EMPTY_CRITERIA, PROP_GROUP_BY, PROP_HAVING, PROP_SOFT_DELETE, Table,
};

use thiserror::Error as ThisError;

///
/// MetaError
///
/// Configuration errors detected while deriving or consuming table
/// metadata. Fatal to the triggering operation; never retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MetaError {
    #[error("table '{table}' has no usable column metadata")]
    NoColumns { table: String },

    #[error("column '{column}' on table '{table}' has neither a physical name nor a property")]
    UnnamedColumn { table: String, column: String },

    #[error("table '{table}' has no id column; key-addressed operations are unavailable")]
    NoIdColumn { table: String },

    #[error("table '{table}' declares soft delete but no column carries the deletion flag")]
    MissingDeleteFlag { table: String },

    #[error("table '{table}' marks more than one deletion-flag column: '{first}' and '{second}'")]
    DuplicateDeleteFlag {
        table: String,
        first: String,
        second: String,
    },

    #[error("table '{table}' property '{key}' has unsupported value '{value}'")]
    InvalidProperty {
        table: String,
        key: String,
        value: String,
    },
}
