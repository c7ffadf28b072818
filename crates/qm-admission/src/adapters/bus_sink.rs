//! Event Bus Notification Adapter
//!
//! Implements `NotificationSink` by publishing onto the shared bus.

use crate::ports::outbound::NotificationSink;
use async_trait::async_trait;
use qm_bus::{EventPublisher, MintNotification};
use std::sync::Arc;
use tracing::{debug, warn};

/// Publishes admission notifications to an [`EventPublisher`].
pub struct BusNotificationSink<P: EventPublisher> {
    publisher: Arc<P>,
}

impl<P: EventPublisher> BusNotificationSink<P> {
    /// Wrap a publisher.
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    /// The wrapped publisher.
    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }
}

#[async_trait]
impl<P: EventPublisher + 'static> NotificationSink for BusNotificationSink<P> {
    async fn notify(&self, notification: MintNotification) {
        let name = notification.event.name();
        let receivers = self.publisher.publish(notification).await;
        if receivers == 0 {
            warn!(event = name, "[qm-admission] Notification had no subscribers");
        } else {
            debug!(event = name, receivers, "[qm-admission] Notification published");
        }
    }
}
