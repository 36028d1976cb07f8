use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `tailfunnel` - expose one local port through Tailscale Funnel and follow
/// hostname changes.
#[derive(Parser, Debug)]
#[command(name = "tailfunnel")]
#[command(version)]
#[command(about = "Single-slot Tailscale Funnel controller.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.tailfunnel/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging (overridden by TAILFUNNEL_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the funnel service with an interactive `funnel ...` console on stdin
    Run,

    /// Show availability, routes, node and counters
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
