use futures::{Stream, StreamExt as _};

/// A pubsub subscription to a single channel on a dedicated connection.
pub struct Subscription {
    pubsub: redis::aio::PubSub,
    channel: String,
}

impl Subscription {
    pub async fn open(client: &redis::Client, channel: &str) -> redis::RedisResult<Self> {
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;
        Ok(Self {
            pubsub,
            channel: channel.to_string(),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Payloads in arrival order. Ends when the connection goes away. A
    /// payload that is not a UTF-8 string comes through as an error.
    pub fn messages(&mut self) -> impl Stream<Item = redis::RedisResult<String>> + '_ {
        self.pubsub.on_message().map(|msg| msg.get_payload::<String>())
    }

    pub async fn close(mut self) {
        match self.pubsub.unsubscribe(self.channel.as_str()).await {
            Ok(()) => tracing::info!(channel = self.channel.as_str(), "Unsubscribed"),
            Err(err) => tracing::warn!(
                channel = self.channel.as_str(),
                "Failed to unsubscribe cleanly: {}",
                err
            ),
        }
    }
}
