use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dm_reshare::allowlist::RuntimeConfigAllowlist;
use dm_reshare::config::BotConfig;
use dm_reshare::persistence::FileWatermarkStore;
use dm_reshare::twitter::TwitterClient;
use dm_reshare::worker::{PollCycle, cancel_on_signal, run_scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dm_reshare=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(?config, "starting");

    let client = TwitterClient::from_token(&config.twitter_token)
        .context("building Twitter client")?;
    let allowlist = RuntimeConfigAllowlist::with_default_base(
        config.project.clone(),
        config.config_name.clone(),
        &config.runtime_config_token,
    )
    .context("building allow-list client")?;
    let store = FileWatermarkStore::new(&config.state_dir);
    tracing::info!(path = %store.path().display(), "watermark file");

    let period = config.poll.poll_interval;
    let cycle = PollCycle::new(allowlist, store, client, config.poll);

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone()).context("installing signal handlers")?;

    let stats = run_scheduler(&cycle, period, shutdown).await;
    tracing::info!(
        cycles = stats.cycles_run,
        failed = stats.cycles_failed,
        "exiting"
    );
    Ok(())
}
