//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// ephemeral-link - a memory-resident URL shortener with self-expiring links
#[derive(Parser, Debug)]
#[command(name = "ephemeral-link")]
#[command(version)]
#[command(about = "A memory-resident URL shortener with self-expiring links", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print or write a sample configuration file
    GenerateConfig {
        /// Output file path (default: stdout)
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
