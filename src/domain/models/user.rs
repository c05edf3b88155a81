//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked user.
///
/// `handle` is the opaque identity supplied by the front end (unique per
/// user); `leetcode_username` stays `None` until registration completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub handle: String,
    pub leetcode_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The linked username, or `UsernameNotLinked` for interactive flows.
    pub fn linked_username(&self) -> Result<&str, crate::domain::errors::DomainError> {
        self.leetcode_username
            .as_deref()
            .ok_or_else(|| crate::domain::errors::DomainError::UsernameNotLinked(self.handle.clone()))
    }
}
