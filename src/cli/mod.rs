//! CLI module for Scoper.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Scoper - search inside YouTube videos
///
/// Finds the moments in a video whose captions match a query, either by fuzzy
/// text matching or by word-embedding similarity.
#[derive(Parser, Debug)]
#[command(name = "scoper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search a video's captions
    Search {
        /// YouTube URL or video ID
        #[arg(long)]
        video: Option<String>,

        /// Search mode (FUZZY, SEMANTIC, F, S)
        #[arg(short, long)]
        mode: Option<String>,

        /// Maximum number of results
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Caption language, in priority order (repeatable)
        #[arg(long = "language")]
        languages: Vec<String>,

        /// Query text (prompted for interactively when omitted)
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Start the web interface
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a video's captions with their timestamps
    Captions {
        /// YouTube URL or video ID
        #[arg(long)]
        video: String,

        /// Caption language, in priority order (repeatable)
        #[arg(long = "language")]
        languages: Vec<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
