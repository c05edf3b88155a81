//! Registration flow: bind an opaque handle to an external catalog username.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{ActivitySource, Profile, ProgressStore};

pub struct AccountService {
    store: Arc<dyn ProgressStore>,
    activity: Arc<dyn ActivitySource>,
}

impl AccountService {
    pub fn new(store: Arc<dyn ProgressStore>, activity: Arc<dyn ActivitySource>) -> Self {
        Self { store, activity }
    }

    /// Create the user if needed, confirm the username exists on the external
    /// catalog, and bind it. Returns the profile for display.
    ///
    /// An unknown username is `ProfileNotFound`, a business outcome for the
    /// caller to show, not a fault.
    pub async fn register(&self, handle: &str, username: &str) -> DomainResult<Profile> {
        self.store.get_or_create_user(handle).await?;

        let profile = self
            .activity
            .fetch_profile(username)
            .await?
            .ok_or_else(|| DomainError::ProfileNotFound(username.to_string()))?;

        self.store.set_leetcode_username(handle, username).await?;
        Ok(profile)
    }
}
