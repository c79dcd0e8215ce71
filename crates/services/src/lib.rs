#![forbid(unsafe_code)]

pub mod error;
pub mod scoring;

pub use quiz_core::Clock;

pub use error::{EngineError, ProgressError};
pub use scoring::{
    CompletedSession, DomainSelectItem, MenuSummary, ProgressService, ResultsSummary, ScoringEngine,
};
