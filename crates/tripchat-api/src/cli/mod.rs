//! CLI command definitions for the `tripchat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Travel assistant chat service.
#[derive(Parser)]
#[command(name = "tripchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config.toml (defaults to $TRIPCHAT_CONFIG, then ~/.tripchat/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides `[server] port`).
        #[arg(short, long, env = "TRIPCHAT_PORT")]
        port: Option<u16>,

        /// Host to bind to (overrides `[server] host`).
        #[arg(long, env = "TRIPCHAT_HOST")]
        host: Option<String>,
    },

    /// Send one message through the chat pipeline and print the reply.
    Ask {
        /// Session identifier to attach the message to.
        #[arg(short, long, default_value = "cli")]
        session: String,

        /// The message text.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Print the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
