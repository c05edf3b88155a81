//! LeetTrack tracks a user's progress on LeetCode practice problems.
//!
//! A background reconciliation loop periodically compares locally assigned
//! tasks against each user's recent accepted submissions, marks completions,
//! evaluates a fixed catalog of milestone achievements, and emits
//! notifications. A suggestion pipeline validates generatively proposed
//! problems against the catalog before persisting them as new assignments.
//!
//! # Architecture
//!
//! - **Domain** (`domain`): models, port traits, and the error taxonomy
//! - **Adapters** (`adapters`): SQLite store, LeetCode GraphQL client,
//!   OpenAI suggester, notification sinks
//! - **Services** (`services`): the reconciler, rule engine, and pipelines
//! - **CLI** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AchievementRecord, AchievementRule, AssignedTask, Config, Difficulty, RuleDimension, User,
    RULES,
};
pub use domain::ports::{ActivitySource, Notifier, ProgressStore, Suggester};
pub use services::{Reconciler, ReconcilerHandle, SuggestionService, SweepReport};
