//! netcloud-bot - NetCloud Films catalog bot
//!
//! Watches the private storage channel, republishes posters and videos into
//! the public NetCloud_Films channel and keeps the catalog spreadsheet in
//! sync. Also serves a liveness endpoint for uptime monitoring.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use netcloud_bot::catalog::Catalog;
use netcloud_bot::dispatch::Dispatcher;
use netcloud_bot::sheets::SheetsLedger;
use netcloud_bot::telegram::TelegramClient;
use netcloud_bot::{build_router, AppState};
use netcloud_common::config::{require_file, Credentials, TomlConfig};
use tokio::signal;
use tracing::{error, info, warn};

/// Command-line arguments for netcloud-bot
#[derive(Parser, Debug)]
#[command(name = "netcloud-bot")]
#[command(about = "Catalog bot for the NetCloud Films channel")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "NETCLOUD_CONFIG")]
    config: Option<PathBuf>,

    /// Liveness endpoint host (overrides [http] host)
    #[arg(long, env = "NETCLOUD_HOST")]
    host: Option<String>,

    /// Liveness endpoint port (overrides [http] port)
    #[arg(short, long, env = "NETCLOUD_PORT")]
    port: Option<u16>,

    /// Service-account key file (overrides [sheets] credentials_file)
    #[arg(long, env = "NETCLOUD_SHEETS_CREDENTIALS")]
    credentials_file: Option<PathBuf>,

    /// Telegram application id
    #[arg(long, env = "API_ID", hide_env_values = true)]
    api_id: Option<String>,

    /// Telegram application hash
    #[arg(long, env = "API_HASH", hide_env_values = true)]
    api_hash: Option<String>,

    /// Bot token from @BotFather
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_path) = TomlConfig::load_or_default(args.config.as_deref())?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting NetCloud bot (netcloud-bot) v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using compiled defaults"),
    }

    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(path) = args.credentials_file {
        config.sheets.credentials_file = path;
    }

    let credentials = Credentials::from_parts(
        args.api_id.as_deref(),
        args.api_hash.as_deref(),
        args.bot_token.as_deref(),
    )?;
    require_file(&config.sheets.credentials_file, "Service-account key file")?;
    let topics = config.topic_map()?;
    info!(api_id = credentials.api_id, "✓ Credentials loaded");

    let telegram = TelegramClient::new(&config.telegram, &credentials.bot_token)
        .context("Failed to build Telegram client")?;
    let me = telegram
        .get_me()
        .await
        .context("Bot token rejected by Telegram")?;
    info!(
        "✓ Authenticated as @{}",
        me.username.as_deref().unwrap_or(&me.first_name)
    );

    let ledger = SheetsLedger::connect(&config.sheets)
        .await
        .context("Failed to open the ledger spreadsheet")?;
    info!("✓ Ledger sheet '{}'", ledger.sheet().title);

    let catalog = Catalog::new(
        telegram.clone(),
        ledger,
        topics,
        config.telegram.destination_channel.trim_start_matches('@'),
    );
    let dispatcher = Dispatcher::new(telegram, catalog, config.telegram.storage_chat_id);

    // Liveness endpoint runs independently of the dispatcher
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Liveness endpoint on http://{}/", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, build_router(AppState::new())).await {
            error!("Liveness server error: {}", e);
        }
    });

    info!("✅ Bot started");
    tokio::select! {
        result = dispatcher.run() => result?,
        _ = shutdown_signal() => {},
    }

    // In-flight handlers are not drained
    info!("❌ Bot stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
