//! Publish-to-all-subscribers fan-out.
//!
//! [`Broadcaster`] is the only surface producers see. [`BroadcastHub`] is the
//! in-process implementation backed by a tokio broadcast channel; a web
//! transport forwards from a hub subscription to its own clients.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::error::PublishResult;
use crate::message::LiveMessage;

/// Sink every producer publishes through.
///
/// Implementations deliver to all receivers subscribed at the time of the
/// call and never wait for acknowledgement.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Publish a message, returning how many receivers it was handed to.
    async fn publish(&self, message: LiveMessage) -> PublishResult<usize>;
}

#[async_trait]
impl<B: Broadcaster + ?Sized> Broadcaster for Arc<B> {
    async fn publish(&self, message: LiveMessage) -> PublishResult<usize> {
        (**self).publish(message).await
    }
}

/// Publish and log a failure instead of returning it.
///
/// Returns `true` when the broadcaster accepted the message.
pub async fn publish_logged(broadcaster: &dyn Broadcaster, message: LiveMessage) -> bool {
    let method = message.method();
    match broadcaster.publish(message).await {
        Ok(receivers) => {
            tracing::trace!(method, receivers, "Published message");
            true
        }
        Err(e) => {
            tracing::warn!(method, error = %e, "Failed to publish message");
            false
        }
    }
}

/// Configuration for [`BroadcastHub`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Messages buffered per lagging receiver before it starts skipping
    /// Default: 1024
    pub capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// In-process broadcast hub.
///
/// Slow receivers lag and skip messages rather than slowing producers down.
#[derive(Debug)]
pub struct BroadcastHub {
    sender: broadcast::Sender<LiveMessage>,
    published: AtomicU64,
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// New receiver that sees every message published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveMessage> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total messages accepted since creation.
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

#[async_trait]
impl Broadcaster for BroadcastHub {
    async fn publish(&self, message: LiveMessage) -> PublishResult<usize> {
        self.published.fetch_add(1, Ordering::Relaxed);
        // No subscribers is a normal state, not a failure.
        Ok(self.sender.send(message).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;
    use crate::message::{scenes, SceneEvent};

    struct ClosedBroadcaster;

    #[async_trait]
    impl Broadcaster for ClosedBroadcaster {
        async fn publish(&self, _message: LiveMessage) -> PublishResult<usize> {
            Err(PublishError::Closed)
        }
    }

    fn scene(court: &str) -> LiveMessage {
        LiveMessage::SceneSwitch(SceneEvent::new(court, scenes::LIVE))
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = BroadcastHub::default();
        assert_eq!(hub.publish(scene("C1")).await, Ok(0));
        assert_eq!(hub.published_count(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_to_every_subscriber() {
        let hub = BroadcastHub::default();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.receiver_count(), 2);

        assert_eq!(hub.publish(scene("C1")).await, Ok(2));

        assert_eq!(first.recv().await.unwrap().court_id(), Some("C1"));
        assert_eq!(second.recv().await.unwrap().court_id(), Some("C1"));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_messages() {
        let hub = BroadcastHub::default();
        hub.publish(scene("C1")).await.unwrap();

        let mut late = hub.subscribe();
        hub.publish(scene("C2")).await.unwrap();

        assert_eq!(late.recv().await.unwrap().court_id(), Some("C2"));
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_logged_reports_failure() {
        assert!(!publish_logged(&ClosedBroadcaster, scene("C1")).await);

        let hub = BroadcastHub::default();
        assert!(publish_logged(&hub, scene("C1")).await);
    }

    #[tokio::test]
    async fn test_arc_broadcaster_delegates() {
        let hub = Arc::new(BroadcastHub::default());
        let mut rx = hub.subscribe();
        let shared: Arc<dyn Broadcaster> = hub.clone();

        shared.publish(scene("C3")).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().court_id(), Some("C3"));
    }
}
