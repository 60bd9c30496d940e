//! AkerBridge - schedule configuration bridge
//!
//! CLI entry point for sending schedule requests to aker and checking its status.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result, eyre};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use akerbridge::ack::AckContext;
use akerbridge::bridge::{AkerBridge, ServiceStatus};
use akerbridge::cli::{Cli, Command, RequestIds, generate_after_help, get_log_path};
use akerbridge::config::{self, Config};
use akerbridge::dispatch::ResponseDispatcher;
use akerbridge::domain::RequestKind;
use akerbridge::identity::StaticIdentity;
use akerbridge::notify::NotificationBus;
use akerbridge::rendezvous::Rendezvous;
use akerbridge::transport::SocketTransport;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Everything a command needs once the router connection is up
struct Session {
    bridge: AkerBridge,
    notifications: broadcast::Receiver<String>,
}

async fn connect(config: &Config) -> Result<Session> {
    debug!(socket_path = ?config.transport.socket_path, "connect: called");
    let mac = config
        .device
        .mac
        .as_deref()
        .ok_or_else(|| eyre!("device.mac is not set in the configuration"))?;
    let identity = StaticIdentity::from_mac(mac);

    let rendezvous = Arc::new(Rendezvous::new());
    let acks = Arc::new(AckContext::new());
    let bus = Arc::new(NotificationBus::with_default_capacity());
    let notifications = bus.subscribe();

    let dispatcher = ResponseDispatcher::new(rendezvous.clone(), acks.clone(), bus);
    let transport = SocketTransport::connect(
        &config.transport.socket_path,
        Arc::new(dispatcher),
        config.transport.timeout(),
    )
    .await
    .context(format!(
        "Failed to connect to message router at {}",
        config.transport.socket_path.display()
    ))?;

    let bridge = AkerBridge::new(Arc::new(transport), Arc::new(identity), rendezvous, acks)
        .with_policy(config.retry.policy())
        .with_status_timeout(config.status.timeout());

    Ok(Session { bridge, notifications })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help(&config::default_socket_path()));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(socket_path = ?config.transport.socket_path, "AkerBridge loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Status => cmd_status(&config).await,
        Command::Update { file, ids } => cmd_update(&config, file, ids).await,
        Command::Delete { ids } => cmd_delete(&config, ids).await,
    }
}

/// Check whether aker is online
async fn cmd_status(config: &Config) -> Result<()> {
    debug!("cmd_status: called");
    let session = connect(config).await?;

    match session.bridge.check_status().await? {
        ServiceStatus::Online => println!("{} aker is {}", "✓".green(), "online".green()),
        ServiceStatus::NotOnline(status) => {
            println!("{} aker is {} ({})", "✗".yellow(), "not online".yellow(), status)
        }
    }
    Ok(())
}

/// Send a schedule document and wait for its acknowledgment
async fn cmd_update(config: &Config, file: PathBuf, ids: RequestIds) -> Result<()> {
    debug!(?file, ?ids, "cmd_update: called");
    let payload = fs::read(&file).context(format!("Failed to read schedule from {}", file.display()))?;
    let mut session = connect(config).await?;

    session
        .bridge
        .send_managed_request(RequestKind::Update, Some(payload), ids.trans_id, ids.version)
        .await
        .context("Failed to send update request")?;
    println!("{} Sent update (transaction {}, version {})", "→".cyan(), ids.trans_id, ids.version);

    wait_for_ack(&mut session.notifications, Duration::from_secs(ids.wait_secs)).await
}

/// Delete the schedule and wait for its acknowledgment
async fn cmd_delete(config: &Config, ids: RequestIds) -> Result<()> {
    debug!(?ids, "cmd_delete: called");
    let mut session = connect(config).await?;

    session
        .bridge
        .send_managed_request(RequestKind::Delete, None, ids.trans_id, ids.version)
        .await
        .context("Failed to send delete request")?;
    println!("{} Sent delete (transaction {}, version {})", "→".cyan(), ids.trans_id, ids.version);

    wait_for_ack(&mut session.notifications, Duration::from_secs(ids.wait_secs)).await
}

async fn wait_for_ack(notifications: &mut broadcast::Receiver<String>, wait: Duration) -> Result<()> {
    debug!(?wait, "wait_for_ack: called");
    let event = match tokio::time::timeout(wait, notifications.recv()).await {
        Ok(Ok(event)) => event,
        Ok(Err(e)) => return Err(eyre!("Notification channel failed: {}", e)),
        Err(_) => {
            warn!(?wait, "wait_for_ack: no acknowledgment");
            return Err(eyre!("No acknowledgment within {}s", wait.as_secs()));
        }
    };

    if event.contains(",NACK,") {
        println!("{} {}", "✗".red(), event);
        Err(eyre!("aker rejected the request"))
    } else {
        println!("{} {}", "✓".green(), event);
        Ok(())
    }
}
