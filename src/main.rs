mod config;
mod dispatch;
mod github;
mod queue;
mod rules;
mod runner;
mod subscription;

use color_eyre::eyre::{self, WrapErr as _};

use crate::{
    queue::RedisQueue,
    rules::RuleSet,
    runner::{Exit, Runner},
    subscription::Subscription,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();
    color_eyre::install()?;

    let config = config::Config::from_env().wrap_err("Invalid configuration")?;

    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_max_level(config.log_level)
            .finish(),
    )?;

    tracing::info!("Starting GitHub dispatcher");
    tracing::info!(
        "Configuration: Redis={}:{}, Channel={}, RuleFile={:?}, PipelineQueue={}, LogLevel={}",
        config.redis_host,
        config.redis_port,
        config.redis_channel,
        config.config_file_path,
        config.pipeline_queue_name,
        config.log_level.as_str(),
    );

    let rules = RuleSet::load(&config.config_file_path)?;
    if rules.is_empty() {
        tracing::warn!("Rule file contains no rules, every event will be ignored");
    }
    tracing::info!("Loaded {} filter rule(s)", rules.len());
    for rule in rules.iter() {
        tracing::debug!(
            repo = rule.repo.as_str(),
            branch = rule.branch.as_str(),
            "Rule for {}#{} runs {} command(s)",
            rule.repo,
            rule.branch,
            rule.commands.len(),
        );
    }

    let client = redis::Client::open(config.redis_url()).wrap_err("Invalid Redis address")?;
    let queue = RedisQueue::connect(&client)
        .await
        .wrap_err("Failed to connect to Redis")?;
    tracing::info!("Connected to Redis");

    let mut subscription = Subscription::open(&client, &config.redis_channel)
        .await
        .wrap_err_with(|| format!("Failed to subscribe to {}", config.redis_channel))?;
    tracing::info!(channel = subscription.channel(), "Subscribed");

    let mut runner = Runner::new(rules, queue, config.pipeline_queue_name);
    let (exit, _) = runner
        .run_messages(subscription.messages(), shutdown_signal())
        .await;
    subscription.close().await;

    match exit {
        Exit::Shutdown => Ok(()),
        Exit::FeedClosed => Err(eyre::eyre!(
            "Lost subscription to {}",
            config.redis_channel
        )),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", err);
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                futures::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
