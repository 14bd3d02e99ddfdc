//! Strictly Chess - server entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, ConfigArgs};
use strictly_chess::{GameServer, ServerConfig};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => run_server(args).await,
        Command::CheckConfig(args) => check_config(args),
    }
}

/// Run the game server.
async fn run_server(args: ConfigArgs) -> Result<()> {
    let config = resolve_config(args)?;
    info!(?config, "Starting Strictly Chess server");
    GameServer::new(config).serve().await
}

/// Print the resolved configuration.
fn check_config(args: ConfigArgs) -> Result<()> {
    let config = resolve_config(args)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

#[instrument(skip(args), fields(config_path = %args.config.display()))]
fn resolve_config(args: ConfigArgs) -> Result<ServerConfig> {
    let port_var = std::env::var("PORT").ok();
    let config = ServerConfig::load(Some(&args.config))?
        .with_port_var(port_var.as_deref())
        .with_overrides(args.host, args.port, args.public_dir);
    Ok(config)
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_chess=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
