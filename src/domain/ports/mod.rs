//! Port traits at the seams between the core and its collaborators.

pub mod activity;
pub mod notifier;
pub mod store;
pub mod suggester;

pub use activity::{
    ActivitySource, AggregateStats, ProblemInfo, Profile, SkillBreakdown, TagCount,
};
pub use notifier::Notifier;
pub use store::ProgressStore;
pub use suggester::{Suggester, SuggestionBatch, SuggestionCandidate};
