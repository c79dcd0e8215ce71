#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{StatsRepository, StatsSnapshot, Storage, StorageError};
