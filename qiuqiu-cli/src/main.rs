//! # qiuqiu
//!
//! Operator CLI for the QiuQiu device store.
//!
//! ## Commands
//!
//! - `count`: Number of registered devices
//! - `register`: Bind a push token to a device key
//! - `token`: Show the token bound to a device key
//! - `lookup`: Show the device key registered for a token
//! - `delete`: Remove a device binding
//! - `send`: Log a message and print the push payload for its device
//! - `messages`: List logged messages for a token
//!
//! ## Example
//!
//! ```bash
//! qiuqiu register --key dev1 tok-abc
//! qiuqiu send tok-abc "Build finished" --title CI
//! qiuqiu messages tok-abc
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qiuqiu_store::{open_store, BackendKind, Config};
use qiuqiu_types::MessageSubmission;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{device, message};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "qiuqiu.toml";

/// Operator CLI for the QiuQiu device store.
#[derive(Parser, Debug)]
#[command(name = "qiuqiu")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Use the in-memory backend (nothing is persisted)
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count registered devices
    Count,

    /// Bind a push token to a device key
    Register {
        /// Push token
        token: String,

        /// Device key (a new key is generated when omitted)
        #[arg(long, short, default_value = "")]
        key: String,
    },

    /// Show the token bound to a device key
    Token {
        /// Device key
        key: String,
    },

    /// Show the device key registered for a push token
    Lookup {
        /// Push token
        token: String,
    },

    /// Remove a device binding
    Delete {
        /// Device key
        key: String,
    },

    /// Log a message and print the push payload for its device
    Send {
        /// Target push token
        token: String,

        /// Message body
        message: String,

        /// Notification title
        #[arg(long, short)]
        title: Option<String>,

        /// Link opened from the notification
        #[arg(long, short)]
        url: Option<String>,

        /// Unix timestamp in seconds (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// List logged messages for a push token
    Messages {
        /// Push token
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(&config.logging.filter);

    let store = open_store(&config.storage)
        .await
        .with_context(|| format!("Failed to open store {}", config.storage.database.display()))?;

    let result = match cli.command {
        Commands::Count => device::count(store.as_ref()).await,
        Commands::Register { token, key } => device::register(store.as_ref(), &key, &token).await,
        Commands::Token { key } => device::token(store.as_ref(), &key).await,
        Commands::Lookup { token } => device::lookup(store.as_ref(), &token).await,
        Commands::Delete { key } => device::delete(store.as_ref(), &key).await,
        Commands::Send {
            token,
            message,
            title,
            url,
            timestamp,
        } => {
            let submission = MessageSubmission {
                token,
                title,
                message,
                url,
                timestamp,
            };
            message::send(store.as_ref(), submission).await
        }
        Commands::Messages { token } => message::list(store.as_ref(), &token).await,
    };

    store.close().await.context("Failed to close store")?;
    result
}

/// Resolve configuration from `--config`, `./qiuqiu.toml`, or defaults,
/// then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None if default_path.exists() => Config::from_file(default_path)?,
        None => Config::default(),
    };

    if let Some(database) = &cli.database {
        config.storage.database = database.clone();
    }
    if cli.memory {
        config.storage.backend = BackendKind::Memory;
    }
    Ok(config)
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured filter.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
