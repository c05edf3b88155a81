//! Outbound notification port.

use async_trait::async_trait;

/// Fire-and-forget notification sink.
///
/// Delivery failure is the sink's problem; it logs and never surfaces an
/// error to the core.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, handle: &str, text: &str);
}
