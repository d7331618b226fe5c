//! Notification port
//!
//! The engine reports everything a user sees through a [`NotificationSink`].
//! Delivery details (chunking long text, colour, transport) belong to the
//! adapter.

use async_trait::async_trait;
use conclave_domain::{ContextId, Notice};
use std::sync::Arc;

/// Receiver of user-facing text.
///
/// The engine awaits every call before moving on, so notifications arrive in
/// the order the events happened.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, text: &str);

    /// Render and deliver a [`Notice`]
    async fn notice(&self, notice: &Notice) {
        self.notify(&notice.to_string()).await;
    }
}

/// No-op sink
pub struct NoNotifications;

#[async_trait]
impl NotificationSink for NoNotifications {
    async fn notify(&self, _text: &str) {}
}

/// Produces the sink for a conversation context when its session is created
pub trait SinkFactory: Send + Sync {
    fn sink_for(&self, context: &ContextId) -> Arc<dyn NotificationSink>;
}

impl<F> SinkFactory for F
where
    F: Fn(&ContextId) -> Arc<dyn NotificationSink> + Send + Sync,
{
    fn sink_for(&self, context: &ContextId) -> Arc<dyn NotificationSink> {
        self(context)
    }
}
