use crate::{
    criteria::CriteriaError, executor::ExecuteError, model::MetaError, resolve::ResolveError,
    sql::TemplateError,
};
use thiserror::Error as ThisError;

///
/// AccessError
///
/// Top-level error for the data-access surface. Each stage of the
/// pipeline keeps its own error enum; this composes them for callers
/// that drive whole operations end to end.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum AccessError {
    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),
}
