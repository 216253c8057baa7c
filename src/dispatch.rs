use crate::{
    github::PushEvent,
    queue::{Queue, QueueError},
    rules::RuleSet,
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to parse webhook payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to serialize rule: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to push rule for {repo}#{branch} to queue `{queue}`: {source}")]
    Enqueue {
        repo: String,
        branch: String,
        queue: String,
        #[source]
        source: QueueError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The event decoded fine but no rule wants it.
    NoMatch,
    Enqueued { item: String },
}

/// Decodes one payload, finds the first matching rule and appends it to
/// `queue_name`. At most one queue append happens per call.
pub async fn dispatch<Q: Queue>(
    payload: &str,
    rules: &RuleSet,
    queue: &mut Q,
    queue_name: &str,
) -> Result<Dispatched, DispatchError> {
    let event = PushEvent::decode(payload).map_err(DispatchError::Decode)?;

    tracing::debug!(
        repo = event.repo(),
        git_ref = event.reference.as_str(),
        "Processing push event for {} at {}",
        event.repo(),
        event.reference,
    );

    let rule = match rules.find_match(event.repo(), &event.reference) {
        Some(rule) => rule,
        None => {
            tracing::debug!(
                repo = event.repo(),
                git_ref = event.reference.as_str(),
                "No matching rule for {} at {}",
                event.repo(),
                event.reference,
            );
            return Ok(Dispatched::NoMatch);
        }
    };

    let item = serde_json::to_string(rule).map_err(DispatchError::Serialize)?;

    queue
        .push_back(queue_name, item.clone())
        .await
        .map_err(|source| DispatchError::Enqueue {
            repo: rule.repo.clone(),
            branch: rule.branch.clone(),
            queue: queue_name.to_string(),
            source,
        })?;

    tracing::info!(
        repo = rule.repo.as_str(),
        branch = rule.branch.as_str(),
        queue = queue_name,
        "Queued {} command(s) for {}#{}",
        rule.commands.len(),
        rule.repo,
        rule.branch,
    );

    Ok(Dispatched::Enqueued { item })
}
