//! Sentinel - oracle trigger daemon
//!
//! Polls every configured subscription on its own task and prints emitted
//! events as JSON lines on stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use tokio::signal;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_core::catalog;
use sentinel_ledger::{EthersLedgerClient, LedgerClient};
use sentinel_triggers::{
    EmittedEvent, MemoryStateStore, RedisStateStore, ResolvedSubscription, SentinelConfig, StateBackend, StateStore,
    TriggerPoller, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("sentinel")
        .version(VERSION)
        .about("Oracle feed, VRF, automation and L2 sequencer trigger daemon")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("OUTPUT")
                .help("Generate example config and exit"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Poll every subscription once and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Emit logs as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Initialize logging
    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    init_logging(log_level, matches.get_flag("log-json"));

    // Handle config generation
    if let Some(output_path) = matches.get_one::<String>("generate-config") {
        SentinelConfig::default().save_to_file(output_path)?;
        info!("Generated example config at: {}", output_path);
        return Ok(());
    }

    info!(version = VERSION, "Sentinel starting");

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let config = SentinelConfig::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let network = config.network.name;
    if let Some(chain_id) = config.network.chain_id {
        match catalog::network_by_chain_id(chain_id) {
            Some(known) => info!(chain_id, network = known.name, "Chain id matches a catalog network"),
            None => debug!(chain_id, "Custom chain id"),
        }
    }

    let rpc_url = config.rpc_url()?;
    let client = Arc::new(EthersLedgerClient::new(
        &rpc_url,
        Duration::from_secs(config.network.request_timeout_secs),
    )?);

    let subscriptions = config
        .subscriptions
        .iter()
        .map(|subscription| {
            subscription
                .resolve(network)
                .with_context(|| format!("Failed to resolve subscription {}", subscription.id))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if subscriptions.is_empty() {
        warn!("No subscriptions configured, nothing to poll");
        return Ok(());
    }

    info!(
        network = %network,
        subscriptions = subscriptions.len(),
        interval_secs = config.polling.interval_secs,
        backend = ?config.state.backend,
        "Sentinel ready"
    );

    let once = matches.get_flag("once");
    let interval = Duration::from_secs(config.polling.interval_secs);

    match config.state.backend {
        StateBackend::Memory => {
            let store = Arc::new(MemoryStateStore::new());
            run(TriggerPoller::new(client, store, network), subscriptions, interval, once).await
        }
        StateBackend::Redis => {
            let redis_url = config
                .state
                .redis_url
                .as_deref()
                .context("state.redis_url is required for the redis backend")?;
            let store = Arc::new(RedisStateStore::connect(redis_url, &config.state.key_prefix).await?);
            run(TriggerPoller::new(client, store, network), subscriptions, interval, once).await
        }
    }
}

/// Initialize logging
fn init_logging(log_level: &str, json: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level: {}. Using 'info'", log_level);
            tracing::Level::INFO
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "sentinel_triggers={level},sentinel_ledger={level},sentinel_core={level}",
            level = level
        )
        .into()
    });

    // Logs go to stderr; stdout carries the events
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run<L, S>(
    poller: TriggerPoller<L, S>,
    subscriptions: Vec<ResolvedSubscription>,
    interval: Duration,
    once: bool,
) -> anyhow::Result<()>
where
    L: LedgerClient + 'static,
    S: StateStore + 'static,
{
    let poller = Arc::new(poller);

    if once {
        for subscription in &subscriptions {
            poll_and_publish(&poller, subscription).await;
        }
        return Ok(());
    }

    let mut loops = JoinSet::new();
    for subscription in subscriptions {
        loops.spawn(run_subscription_loop(Arc::clone(&poller), subscription, interval));
    }

    // Set up graceful shutdown
    tokio::select! {
        _ = async { while loops.join_next().await.is_some() {} } => {
            info!("All subscription loops stopped");
        }
        _ = setup_shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    loops.shutdown().await;

    info!("Sentinel stopped");
    Ok(())
}

/// Polls one subscription forever; polls of the same subscription never overlap
async fn run_subscription_loop<L, S>(poller: Arc<TriggerPoller<L, S>>, subscription: ResolvedSubscription, interval: Duration)
where
    L: LedgerClient + 'static,
    S: StateStore + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        poll_and_publish(&poller, &subscription).await;
    }
}

async fn poll_and_publish<L, S>(poller: &TriggerPoller<L, S>, subscription: &ResolvedSubscription)
where
    L: LedgerClient,
    S: StateStore,
{
    match poller.poll(subscription).await {
        Ok(events) => events.iter().for_each(publish),
        Err(e) => warn!(
            subscription = subscription.id.as_str(),
            category = e.category(),
            retryable = e.is_retryable(),
            error = %e,
            "Poll failed, cursor left unchanged"
        ),
    }
}

fn publish(event: &EmittedEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{}", line),
        Err(e) => error!(event = event.event_name(), error = %e, "Failed to serialize event"),
    }
}

/// Set up graceful shutdown signal handling
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
