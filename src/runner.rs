use std::{fmt, future::Future};

use futures::{Stream, StreamExt as _};
use tracing::Instrument as _;

use crate::{
    dispatch::{self, Dispatched},
    queue::Queue,
    rules::RuleSet,
};

/// Why the message loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Shutdown,
    FeedClosed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub received: u64,
    pub enqueued: u64,
    pub ignored: u64,
    pub failed: u64,
}

#[derive(Debug)]
pub struct Runner<Q> {
    rules: RuleSet,
    queue: Q,
    queue_name: String,
}

impl<Q: Queue> Runner<Q> {
    pub fn new(rules: RuleSet, queue: Q, queue_name: String) -> Self {
        Self {
            rules,
            queue,
            queue_name,
        }
    }

    async fn process_message(&mut self, payload: &str, summary: &mut Summary) {
        summary.received += 1;
        tracing::debug!("Received message: {}", payload);

        match dispatch::dispatch(payload, &self.rules, &mut self.queue, &self.queue_name).await {
            Ok(Dispatched::Enqueued { item }) => {
                summary.enqueued += 1;
                tracing::debug!("Pushed rule to queue: {}", item);
            }
            Ok(Dispatched::NoMatch) => summary.ignored += 1,
            Err(err) => {
                summary.failed += 1;
                tracing::error!(queue = self.queue_name.as_str(), "{}", err);
            }
        }
    }

    /// Handles messages one at a time, in arrival order, until `shutdown`
    /// resolves or the feed ends. A message that is already being dispatched
    /// is finished before shutdown is observed. Feed errors count as failed
    /// messages and never stop the loop.
    pub async fn run_messages<S, E, F>(&mut self, feed: S, shutdown: F) -> (Exit, Summary)
    where
        S: Stream<Item = Result<String, E>>,
        E: fmt::Display,
        F: Future<Output = ()>,
    {
        futures::pin_mut!(feed);
        futures::pin_mut!(shutdown);

        let mut summary = Summary::default();
        tracing::info!("Waiting for messages...");

        let exit = loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!("Shutting down, no longer accepting messages");
                    break Exit::Shutdown;
                }

                payload = feed.next() => match payload {
                    Some(Ok(payload)) => {
                        let span = tracing::info_span!(
                            "message",
                            seq = summary.received + 1,
                            queue = self.queue_name.as_str(),
                        );
                        self.process_message(&payload, &mut summary)
                            .instrument(span)
                            .await
                    }
                    Some(Err(err)) => {
                        summary.received += 1;
                        summary.failed += 1;
                        tracing::error!(
                            seq = summary.received,
                            "Dropping message with unreadable payload: {}",
                            err
                        );
                    }
                    None => {
                        tracing::warn!("Subscription feed closed");
                        break Exit::FeedClosed;
                    }
                },
            }
        };

        tracing::info!(
            received = summary.received,
            enqueued = summary.enqueued,
            ignored = summary.ignored,
            failed = summary.failed,
            "Stopped after {} message(s)",
            summary.received,
        );
        (exit, summary)
    }
}
