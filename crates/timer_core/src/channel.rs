use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use shared::error::ChannelError;
use tokio::sync::{broadcast, Mutex};

const TOPIC_CHANNEL_CAPACITY: usize = 1024;

/// Opaque pub/sub primitive supplied by the hosting platform.
///
/// Delivery is assumed at-least-once and unordered across topics. Publishing
/// is fire-and-forget; there is no acknowledgment to wait on.
#[async_trait]
pub trait PubSubChannel: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError>;
    async fn subscribe(&self, topic: &str)
        -> Result<broadcast::Receiver<Vec<u8>>, ChannelError>;
}

/// Stands in when the platform transport is not wired up. Every call fails,
/// which callers translate into local-only mode.
pub struct MissingPubSubChannel;

#[async_trait]
impl PubSubChannel for MissingPubSubChannel {
    async fn publish(&self, topic: &str, _payload: Vec<u8>) -> Result<(), ChannelError> {
        Err(ChannelError::Unavailable(format!(
            "platform pub/sub transport is not wired (topic {topic})"
        )))
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<broadcast::Receiver<Vec<u8>>, ChannelError> {
        Err(ChannelError::Unavailable(format!(
            "platform pub/sub transport is not wired (topic {topic})"
        )))
    }
}

/// In-process fan-out channel for tests and same-process demos. Topics are
/// created on first use by either side.
pub struct LoopbackChannel {
    topics: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

impl LoopbackChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            topics: Mutex::new(HashMap::new()),
        })
    }

    async fn sender_for(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl PubSubChannel for LoopbackChannel {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError> {
        // No subscribers yet is not a failure; the message is simply lost,
        // which at-least-once delivery already permits.
        let _ = self.sender_for(topic).await.send(payload);
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<broadcast::Receiver<Vec<u8>>, ChannelError> {
        Ok(self.sender_for(topic).await.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_delivers_to_all_subscribers() {
        let channel = LoopbackChannel::new();
        let mut first = channel.subscribe("t").await.expect("subscribe");
        let mut second = channel.subscribe("t").await.expect("subscribe");
        channel.publish("t", b"ping".to_vec()).await.expect("publish");
        assert_eq!(first.recv().await.expect("recv"), b"ping");
        assert_eq!(second.recv().await.expect("recv"), b"ping");
    }

    #[tokio::test]
    async fn loopback_publish_without_subscribers_is_fire_and_forget() {
        let channel = LoopbackChannel::new();
        channel.publish("t", b"ping".to_vec()).await.expect("publish");
    }

    #[tokio::test]
    async fn missing_channel_is_unavailable() {
        let channel = MissingPubSubChannel;
        let err = channel.subscribe("t").await.expect_err("must fail");
        assert!(matches!(err, ChannelError::Unavailable(_)));
    }
}
