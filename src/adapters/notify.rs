//! Notification sink adapters.

use async_trait::async_trait;

use crate::domain::ports::Notifier;

/// Sink that writes notifications to the log. The default when no delivery
/// transport is wired in.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, handle: &str, text: &str) {
        tracing::info!(handle, text, "notification");
    }
}
