//! Domain errors for the LeetTrack system.

use thiserror::Error;

/// Domain-level errors.
///
/// The `*NotFound` / `*NotLinked` variants are business outcomes shown to the
/// caller, not logged as errors. `Upstream` is a transient failure talking to
/// the external catalog; the reconciler swallows it per user and the sweep
/// interval is the only retry mechanism.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not registered: {0}")]
    UserNotFound(String),

    #[error("No linked LeetCode username for {0}")]
    UsernameNotLinked(String),

    #[error("LeetCode profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Assigned task not found: {0}")]
    TaskNotFound(i64),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether this error is a business-level absence rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::UsernameNotLinked(_)
                | Self::ProfileNotFound(_)
                | Self::TaskNotFound(_)
        )
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::Upstream(err.to_string())
    }
}
