//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

/// AkerBridge - schedule configuration bridge to the aker peer
#[derive(Parser)]
#[command(
    name = "ab",
    about = "Send schedule updates to aker and check its status",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask aker whether it is online
    Status,

    /// Send a schedule document to aker
    Update {
        /// File holding the schedule document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        ids: RequestIds,
    },

    /// Delete the schedule held by aker
    Delete {
        #[command(flatten)]
        ids: RequestIds,
    },
}

/// Ids reported back in the acknowledgment, and how long to wait for it
#[derive(Debug, Clone, clap::Args)]
pub struct RequestIds {
    /// Transaction id
    #[arg(short, long = "trans-id")]
    pub trans_id: u16,

    /// Document version
    #[arg(short, long = "version", id = "doc_version")]
    pub version: u32,

    /// Seconds to wait for the acknowledgment
    #[arg(short, long = "wait-secs", default_value = "30")]
    pub wait_secs: u64,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("akerbridge")
        .join("logs")
        .join("akerbridge.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with router socket state and log location
pub fn generate_after_help(socket_path: &Path) -> String {
    debug!(?socket_path, "generate_after_help: called");
    let mut help = String::new();

    help.push_str("Message router:\n");
    let (icon, state) = if socket_path.exists() {
        debug!("generate_after_help: socket present");
        ("\u{2705}", "present")
    } else {
        debug!("generate_after_help: socket missing");
        ("\u{274C}", "missing")
    };
    help.push_str(&format!("  {} {} ({})\n", icon, socket_path.display(), state));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));

    help
}
