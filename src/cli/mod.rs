//! CLI module for Shoplite.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Shoplite - grounded customer support assistant
///
/// Serves a retrieval-gated support chat over the Shoplite knowledge base,
/// plus a raw text generation endpoint.
#[derive(Parser, Debug)]
#[command(name = "shoplite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SHOPLITE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask the support assistant a question
    Ask {
        /// The customer question
        question: String,
    },

    /// Show which documents a query retrieves
    Search {
        /// Search query
        query: String,

        /// Number of neighbours to consider
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum distance for a document to count as relevant
        #[arg(short, long)]
        threshold: Option<f32>,
    },

    /// Generate text from a raw prompt
    Generate {
        /// Prompt to complete
        prompt: String,

        /// Maximum tokens to generate
        #[arg(short, long)]
        max_tokens: Option<u32>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,
    },

    /// Smoke-test a running server
    Probe {
        /// Base URL of the server
        #[arg(default_value = "http://127.0.0.1:8000")]
        url: String,
    },

    /// Check configuration and backend credentials
    Doctor,

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

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["shoplite", "serve", "--host", "0.0.0.0", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_options() {
        let cli = Cli::try_parse_from(["shoplite", "-vv", "search", "refunds", "-k", "3", "-t", "0.8"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search { query, top_k, threshold } => {
                assert_eq!(query, "refunds");
                assert_eq!(top_k, Some(3));
                assert_eq!(threshold, Some(0.8));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_probe_default_url() {
        let cli = Cli::try_parse_from(["shoplite", "probe"]).unwrap();
        assert!(matches!(cli.command, Commands::Probe { url } if url == "http://127.0.0.1:8000"));
    }
}
