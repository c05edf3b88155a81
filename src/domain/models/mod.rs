//! Domain models for the LeetTrack system.

pub mod achievement;
pub mod config;
pub mod task;
pub mod user;

pub use achievement::{rule_by_key, AchievementRecord, AchievementRule, RuleDimension, RULES};
pub use config::{
    Config, ConfigError, DatabaseConfig, LeetCodeConfig, LoggingConfig, OpenAiConfig, TrackerConfig,
};
pub use task::{AssignedTask, Difficulty};
pub use user::User;
