//! CLI module - Command-line interface for Linkscout
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Linkscout - LinkedIn company page discovery
#[derive(Parser)]
#[command(name = "linkscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "web")]
    Serve,

    /// Discover the LinkedIn page for a company name once
    #[command(alias = "l")]
    Lookup {
        /// Company name
        #[arg(required = true)]
        name: Vec<String>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Create default config file
    Init,

    /// Manage the discovery cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Show search statistics
    Stats {
        /// Look back this many days
        #[arg(long, default_value = "7")]
        days: u32,
        /// Number of top search terms to list
        #[arg(long, default_value = "10")]
        top: u64,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Delete expired cache entries and stale rate-limit windows
    Purge,
}

pub use commands::*;
