use thiserror::Error;

use crate::model::{
    CatalogError, DomainError, DomainIdError, DomainProgressError, ScoreError, StatsError,
};

/// Unified error for the core domain layer.
///
/// Each model module defines its own focused error type; this enum exists so
/// callers that cross module boundaries can hold one error without losing the
/// original variant.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    DomainId(#[from] DomainIdError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    DomainProgress(#[from] DomainProgressError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}
