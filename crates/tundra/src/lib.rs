//! ## Crate layout
//! - `core`: runtime metadata, criteria grammar, and statement assembly.
//! - this crate: the mapper facade driving whole operations through a
//!   backend executor, plus the user-facing prelude.

pub use tundra_core as core;

pub mod mapper;

pub use mapper::Mapper;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Mapper,
        core::{
            criteria::{Clause, CriteriaTree, Query, Wrapper},
            error::AccessError,
            executor::StatementExecutor,
            model::{DeleteFlagSpec, FieldSpec, OrderDirection, SpecValue, TableSpec},
            resolve::FieldAccessor,
            sql::SqlStatement,
            traits::{FieldValues as _, Record},
            value::{FieldValue as _, Value},
        },
    };
}
