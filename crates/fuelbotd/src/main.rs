//! fuelbotd - EVE structure fuel monitor
//!
//! Wires the components together:
//! - Configuration loading and validation
//! - SSO credentials and the ESI client
//! - Discord sink and command listener
//! - The fuel monitor loop and the status command dispatcher

use anyhow::{Context, Result};
use clap::Parser;
use fuelbot_config::{Settings, load_config};
use fuelbot_core::{
    Collaborators, CommandDispatcher, Deduplicator, FuelMonitor, InMemoryNotificationStore,
    PriceEstimator, StatusReporter,
};
use fuelbot_discord::DiscordClient;
use fuelbot_esi::{EsiClient, SsoConfig, SsoCredentials, TokenFile, http_client};
use fuelbot_util::{default_config_path, default_data_dir, format_duration, is_mock_time_active};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// fuelbotd - Alerts a Discord channel before corporation structures run out of fuel
#[derive(Parser, Debug)]
#[command(name = "fuelbotd")]
#[command(about = "Alerts a Discord channel before EVE structures run out of fuel", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/fuelbot/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory holding the token file (or set FUELBOT_DATA_DIR env var)
    #[arg(short, long, env = "FUELBOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Discord bot token
    #[arg(long, env = "FUELBOT_DISCORD_TOKEN", hide_env_values = true)]
    discord_token: String,

    /// EVE SSO application secret
    #[arg(long, env = "FUELBOT_SSO_SECRET", hide_env_values = true)]
    sso_secret: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

/// Main service state
struct Service {
    settings: Settings,
    monitor: FuelMonitor,
    dispatcher: CommandDispatcher,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let settings = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            structure_types = settings.rules.structure_type_count(),
            commodities = settings.commodities.len(),
            "Configuration loaded"
        );

        let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let auth_file = settings.esi.auth_file_in(&data_dir);
        info!(auth_file = %auth_file.display(), "Using token file");

        let http = http_client(settings.bot.request_timeout)
            .context("Failed to create HTTP client")?;

        let credentials = Arc::new(SsoCredentials::new(
            http.clone(),
            SsoConfig::new(settings.esi.client_id.clone(), args.sso_secret.clone()),
            TokenFile::new(auth_file),
        ));
        let esi = Arc::new(EsiClient::new(http.clone(), settings.esi.market_region_id));
        let discord = Arc::new(DiscordClient::new(http, args.discord_token.clone()));

        let collaborators = Collaborators {
            credentials,
            structures: esi.clone(),
            market: esi,
            sink: discord.clone(),
            request_timeout: settings.bot.request_timeout,
        };

        let rules = Arc::new(settings.rules.clone());

        let dedup = Deduplicator::new(
            Box::new(InMemoryNotificationStore::new()),
            settings.bot.refuel_window,
            settings.bot.notify_interval,
        );
        let monitor = FuelMonitor::new(
            collaborators.clone(),
            rules.clone(),
            dedup,
            settings.discord.channel_id.clone(),
            settings.bot.check_interval,
        );

        let reporter = Arc::new(StatusReporter::new(
            collaborators,
            rules,
            settings.commodities.clone(),
            PriceEstimator::new(settings.bot.price_window_days, settings.bot.request_timeout),
        ));
        let dispatcher = CommandDispatcher::new(
            discord,
            reporter,
            settings.discord.command_channels.clone(),
            settings.bot.command_poll_interval,
            settings.bot.request_timeout,
        );

        Ok(Self {
            settings,
            monitor,
            dispatcher,
        })
    }

    async fn run_once(mut self) -> Result<()> {
        let report = self.monitor.run_cycle(fuelbot_util::now()).await;
        if report.auth_failed {
            anyhow::bail!("Authentication failed");
        }
        if report.fetch_failed {
            anyhow::bail!("Unable to load structures");
        }
        Ok(())
    }

    async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            check_interval = %format_duration(self.settings.bot.check_interval),
            notify_interval = %format_duration(self.settings.bot.notify_interval),
            refuel_window = %format_duration(self.settings.bot.refuel_window),
            channel_id = %self.settings.discord.channel_id,
            "Service running"
        );

        let mut monitor_handle = tokio::spawn(self.monitor.run(shutdown_rx.clone()));
        let mut dispatcher_handle = tokio::spawn(self.dispatcher.run(shutdown_rx));

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, shutting down gracefully");
            }
            result = &mut monitor_handle => {
                error!(result = ?result, "Fuel monitor exited unexpectedly");
            }
            result = &mut dispatcher_handle => {
                error!(result = ?result, "Command listener exited unexpectedly");
            }
        }

        let _ = shutdown_tx.send(true);

        // A handle already polled to completion above must not be awaited again.
        for (name, handle) in [("monitor", monitor_handle), ("listener", dispatcher_handle)] {
            if handle.is_finished() {
                continue;
            }
            if let Err(e) = handle.await {
                warn!(task = name, error = %e, "Task did not stop cleanly");
            }
        }

        info!("Service stopped");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "fuelbotd starting");

    if is_mock_time_active() {
        warn!("Mock time is active, timestamps are shifted");
    }

    let service = Service::new(&args)?;
    if args.once {
        service.run_once().await
    } else {
        service.run().await
    }
}
