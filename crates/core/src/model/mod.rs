pub mod domain;
pub mod ids;
pub mod progress;
pub mod session;
pub mod stats;

pub use domain::{CatalogError, Domain, DomainCatalog, DomainError};
pub use ids::{DomainId, DomainIdError};
pub use progress::{DomainProgress, DomainProgressError, Score, ScoreError};
pub use session::SessionStats;
pub use stats::{GlobalStats, StatsError};
