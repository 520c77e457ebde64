//! CLI commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pubsub - in-process publish/subscribe registry
#[derive(Parser, Debug)]
#[command(name = "pubsub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (jsonc, json, yml or yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe an observer, wait, then publish to it
    Demo {
        /// Event to subscribe and publish
        #[arg(short, long, default_value = "test")]
        event: String,

        /// Observer identity for the subscription
        #[arg(short, long, default_value = "example.index")]
        observer: String,

        /// Payload to publish; parsed as JSON when possible
        #[arg(short, long, default_value = "example.index")]
        data: String,

        /// Milliseconds to wait before publishing
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,

        /// Also subscribe an observer that fails ahead of the demo observer
        #[arg(long)]
        with_failing: bool,
    },

    /// Print the events known to a freshly configured registry
    Events {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
