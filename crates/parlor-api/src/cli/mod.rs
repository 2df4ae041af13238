//! CLI command definitions and dispatch for the `parlor` binary.
//!
//! Uses clap derive macros for argument parsing. Besides `serve`, every
//! command is a one-shot operation against the configured store.

pub mod message;
pub mod participant;
pub mod reap;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A small chat room backend with presence tracking.
#[derive(Parser)]
#[command(name = "parlor", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./parlor.toml).
    #[arg(long, global = true, env = "PARLOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors. Command output is still printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server and the idle-participant reaper.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// List participants currently in the room.
    #[command(alias = "ls")]
    Participants,

    /// Show the messages a participant can see.
    Messages {
        /// Participant whose view to show.
        #[arg(long, short)]
        user: String,

        /// Only the latest N messages.
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Run one reaper cycle now and print what it evicted.
    Reap,
}

impl Cli {
    /// Default tracing filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,parlor=debug",
            _ => "trace",
        }
    }
}
