use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rootify", version, about = "Chinese word-root dictionary and translator")]
pub struct Cli {
    /// JSON config profile
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List word roots
    List {
        /// Only roots whose key or gloss contains this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Add or update a word root
    Add { chinese: String, english: String },
    /// Delete a word root
    Delete { chinese: String },
    /// Delete every word root
    Clear,
    /// Import word roots from a CSV file
    Import {
        file: PathBuf,
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Export word roots as CSV
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split text into word roots
    Segment {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Translate text using word roots
    Translate { text: String },
    /// Exit non-zero when some characters have no word root
    Check { text: String },
}
