//! Valuation Server
//!
//! REST API for the DCF, venture-capital and price-elasticity engines.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use valuation_server::config::{build_config, CliArgs as ConfigCliArgs, ServerConfig};
use valuation_server::server::Server;

/// Valuation Server - REST API for the valuation engines
#[derive(Parser, Debug)]
#[command(name = "valuation_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Company fundamentals dataset (TOML)
    #[arg(long, value_name = "FILE")]
    fundamentals: Option<PathBuf>,

    /// Product elasticity catalog (TOML)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            fundamentals_file: args.fundamentals,
            catalog_file: args.catalog,
        }
    }
}

fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.as_filter_str()));
    let registry = tracing_subscriber::registry().with(filter);

    if config.environment.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(&config);

    tracing::info!("Valuation Server v{}", valuation_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        environment = %config.environment,
        shutdown_timeout_secs = config.shutdown_timeout_secs,
        cors_permissive = config.cors_permissive,
        fundamentals_file = ?config.fundamentals_file,
        catalog_file = ?config.catalog_file,
        "Server configuration loaded"
    );

    let server = Server::from_config(config)?;
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
