use std::future::Future;

use redis::AsyncCommands as _;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// A named list that producers append to and the pipeline pops from the head.
pub trait Queue {
    fn push_back(&mut self, queue: &str, item: String)
        -> impl Future<Output = Result<(), QueueError>>;
}

#[derive(Clone)]
pub struct RedisQueue {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisQueue {
    pub async fn connect(client: &redis::Client) -> Result<Self, QueueError> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { conn })
    }
}

impl Queue for RedisQueue {
    async fn push_back(&mut self, queue: &str, item: String) -> Result<(), QueueError> {
        let _: i64 = self.conn.rpush(queue, item).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every append, optionally failing instead.
    #[derive(Debug, Default)]
    pub struct RecordingQueue {
        pub pushed: Vec<(String, String)>,
        pub fail: bool,
    }

    impl RecordingQueue {
        pub fn failing() -> Self {
            Self {
                pushed: Vec::new(),
                fail: true,
            }
        }
    }

    impl Queue for RecordingQueue {
        async fn push_back(&mut self, queue: &str, item: String) -> Result<(), QueueError> {
            if self.fail {
                return Err(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection refused",
                ))
                .into());
            }
            self.pushed.push((queue.to_string(), item));
            Ok(())
        }
    }
}
