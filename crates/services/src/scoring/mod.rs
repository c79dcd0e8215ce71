mod engine;
mod view;
mod workflow;

pub use engine::{CompletedSession, ScoringEngine};
pub use view::{DomainSelectItem, MenuSummary, ResultsSummary, domain_select_items};
pub use workflow::ProgressService;
