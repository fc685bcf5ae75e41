// File: src/main.rs
// Block explorer for bitcoind-compatible nodes: block lists, block and transaction detail, coinbase leaderboard

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod aggregator;
mod block_source;
mod cli_interface;
mod config;
mod data_models;
mod decoder;
mod error;
mod explorer;
mod model;
mod pager;
mod renderer;
mod scoreboard;
mod web_server;

#[cfg(test)]
mod test_support;

use crate::block_source::{BlockSource, FixtureBlockSource, RpcBlockSource};
use crate::cli_interface::CliRequest;
use crate::config::Config;
use crate::explorer::Explorer;
use crate::renderer::Renderer;
use crate::web_server::AppState;

/// Command-line interface definition for the explorer
#[derive(Parser)]
#[command(name = "coinbase-explorer")]
#[command(about = "Block explorer views with a coinbase message leaderboard")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Node JSON-RPC endpoint
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,

    #[arg(long)]
    pub rpc_user: Option<String>,

    #[arg(long)]
    pub rpc_password: Option<String>,

    /// Serve blocks from a JSON snapshot instead of a node
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Show timestamps in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Interface mode selection
    #[command(subcommand)]
    pub mode: InterfaceMode,
}

/// Available interface modes
#[derive(Subcommand)]
pub enum InterfaceMode {
    /// Print views to the terminal
    Cli {
        /// Show the newest N blocks
        #[arg(short, long, default_value = "10")]
        count: u64,

        /// Show the block page whose newest block is at this height
        #[arg(short, long)]
        start: Option<u64>,

        /// Show a block by hash
        #[arg(short, long)]
        block: Option<String>,

        /// Show a block by height
        #[arg(long)]
        height: Option<u64>,

        /// Show a transaction by id
        #[arg(short, long)]
        tx: Option<String>,

        /// Show the coinbase message leaderboard
        #[arg(long)]
        scores: bool,
    },

    /// Serve HTML pages and the JSON API
    Web {
        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address
        #[arg(short, long)]
        bind: Option<String>,

        /// Enable CORS for development
        #[arg(short, long)]
        cors: bool,
    },
}

impl Cli {
    /// Fold command-line overrides into the file configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(user) = &self.rpc_user {
            config.rpc_user = Some(user.clone());
        }
        if let Some(password) = &self.rpc_password {
            config.rpc_password = Some(password.clone());
        }
        if let Some(fixture) = &self.fixture {
            config.fixture = Some(fixture.clone());
        }
        if self.utc {
            config.utc_timestamps = true;
        }
        if let InterfaceMode::Web { port, bind, cors } = &self.mode {
            if let Some(port) = port {
                config.port = *port;
            }
            if let Some(bind) = bind {
                config.bind = bind.clone();
            }
            if *cors {
                config.cors = true;
            }
        }
    }
}

fn block_source(config: &Config) -> Result<Arc<dyn BlockSource>> {
    match &config.fixture {
        Some(path) => {
            let source = FixtureBlockSource::load(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            Ok(Arc::new(source))
        }
        None => {
            info!("Using node RPC at {}", config.rpc_url);
            Ok(Arc::new(RpcBlockSource::new(config.rpc_url.clone(), config.rpc_auth())))
        }
    }
}

/// Main application entry point
/// Routes to appropriate interface mode based on CLI arguments
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let explorer = Explorer::from_config(block_source(&config)?, &config);

    match cli.mode {
        InterfaceMode::Cli { count, start, block, height, tx, scores } => {
            let request = CliRequest::from_flags(count, start, block, height, tx, scores)?;
            cli_interface::run_cli_mode(&explorer, request).await
        }

        InterfaceMode::Web { .. } => {
            println!("🌐 Coinbase Explorer - Web Server Mode");
            println!("Starting server at http://{}:{}", config.bind, config.port);
            let state = AppState {
                explorer,
                renderer: Arc::new(Renderer::default()),
            };
            web_server::run_web_mode(state, &config.bind, config.port, config.cors).await
        }
    }
}
