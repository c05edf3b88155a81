//! Service layer: the reconciliation loop, rule engine, and write pipelines.

pub mod accounts;
pub mod achievements;
pub mod reconciler;
pub mod suggestions;

pub use accounts::AccountService;
pub use reconciler::{Reconciler, ReconcilerHandle, SweepReport};
pub use suggestions::{SuggestionOutcome, SuggestionService};
