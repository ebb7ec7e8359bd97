//! CLI module for Daun.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Daun - Plant-disease diagnosis and RAG
///
/// A CLI tool for diagnosing plant-leaf diseases and answering questions
/// grounded in a research-journal corpus. The name "Daun" comes from the
/// Indonesian word for "leaf."
#[derive(Parser, Debug)]
#[command(name = "daun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
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
    /// Check system requirements and configuration
    Doctor,

    /// Build the vector index from the document corpus
    Index {
        /// Corpus directory (overrides the configured path)
        #[arg(short = 'd', long)]
        corpus: Option<String>,

        /// Snapshot output path (overrides the configured path)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Ask a question and get an answer grounded in the corpus
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of passages to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Search for relevant passages without generating an answer
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Start the HTTP API server (chat and image diagnosis)
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
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

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}
