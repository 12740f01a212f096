//! go2link - log in to the robot cloud service and obtain WebRTC session
//! credentials for a robot.
//!
//! Account credentials come from the environment (a `.env` file is
//! honoured): `GO2LINK_EMAIL`, `GO2LINK_PASSWORD` and `GO2LINK_SERIAL`.
//! The password is prompted for when not set.

mod commands;
mod credentials;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "go2link", version, about = "Robot cloud login and WebRTC session credentials")]
struct Cli {
    /// Config file (defaults to ~/.config/go2link/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to daily-rolling files in this directory
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the cached access token's state and expiry
    Status,
    /// Log in and cache a fresh access token
    Login,
    /// Delete the cached access token
    Logout,
    /// Fetch TURN/ICE session credentials for a robot
    Session {
        /// Robot serial number (defaults to GO2LINK_SERIAL)
        serial: Option<String>,

        /// Leave the public STUN server out of the ICE server list
        #[arg(long)]
        no_stun: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "go2link.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_ref());
    info!("go2link starting");

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Status => commands::status(&config),
        Command::Login => commands::login(&config).await,
        Command::Logout => commands::logout(&config),
        Command::Session { serial, no_stun } => {
            commands::session(&config, serial, !no_stun).await
        }
    }
}
