//! cbmirror CLI
//!
//! Command-line tools for the local tournament mirror.
//!
//! # Commands
//!
//! - `sync` - Fetch every registry from the server and commit it
//! - `show` - Print the contents of one registry
//! - `lookup` - Print one entry by identity
//! - `notify` - Send a live game notification
//! - `version` - Show version information

mod commands;

use cbmirror_localdb::{MirrorConfig, RegistryKind};
use cbmirror_sync::RetryConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Local mirror of a tournament server.
#[derive(Parser)]
#[command(name = "cbmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the cache directory
    #[arg(global = true, short, long, default_value = "cache")]
    cache: PathBuf,

    /// Server base URL
    #[arg(global = true, short, long, default_value = "http://localhost:8000")]
    server: String,

    /// API key sent with every request
    #[arg(global = true, long, env = "CBMIRROR_API_KEY")]
    api_key: Option<String>,

    /// Directory receiving player sound effects
    #[arg(global = true, long)]
    sfx: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(global = true, long, default_value = "10")]
    timeout: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every registry from the server and commit it
    Sync {
        /// Fetch and report without writing to disk
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Print the contents of one registry
    Show {
        /// Registry kind (games, tournaments, players, announcements)
        kind: RegistryKind,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print one entry by identity
    Lookup {
        /// Registry kind (games, tournaments, players, announcements)
        kind: RegistryKind,

        /// Identifier, or username for players
        identity: String,
    },

    /// Send a live game notification
    Notify {
        /// Game identifier
        game: i64,

        #[command(subcommand)]
        notification: commands::notify::Notification,

        /// Consecutive failed deliveries before giving up
        #[arg(long, default_value = "5")]
        attempts: u32,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn config(&self) -> MirrorConfig {
        let mut config = MirrorConfig::new(&self.cache)
            .with_server_url(&self.server)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(dir) = &self.sfx {
            config = config.with_sfx_dir(dir);
        }
        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::with_default(subscriber, || run(cli))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config();

    match cli.command {
        Commands::Sync { dry_run } => {
            commands::sync::run(&config, dry_run)?;
        }
        Commands::Show { kind, format } => {
            commands::show::run(&config, kind, &format)?;
        }
        Commands::Lookup { kind, identity } => {
            commands::lookup::run(&config, kind, &identity)?;
        }
        Commands::Notify {
            game,
            notification,
            attempts,
        } => {
            let config = config.with_retry(RetryConfig::new(attempts));
            commands::notify::run(&config, game, notification)?;
        }
        Commands::Version => {
            println!("cbmirror CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
