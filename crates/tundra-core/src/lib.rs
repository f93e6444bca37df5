//! Core runtime for Tundra: entity metadata, the criteria grammar, the
//! statement assembler, and the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod criteria;
pub mod error;
pub mod executor;
pub mod model;
pub mod resolve;
pub mod sql;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No caches, templates, or internal helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        criteria::{Clause, CriteriaTree, Query, Wrapper},
        model::{FieldSpec, OrderDirection, TableSpec},
        resolve::FieldAccessor,
        traits::{FieldValues, Record},
        value::{FieldValue, Value},
    };
}
