//! Command-line interface for strictly_chess.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Chess - authoritative two-player chess server
#[derive(Parser, Debug)]
#[command(name = "strictly_chess")]
#[command(about = "Two-player chess session server over WebSockets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve(ConfigArgs),

    /// Print the resolved configuration and exit
    CheckConfig(ConfigArgs),
}

/// Flags shared by every command that needs a configuration.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, default_value = "strictly_chess.toml")]
    pub config: PathBuf,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory of static files to serve
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
}
