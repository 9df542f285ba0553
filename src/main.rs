//! Shoplite CLI entry point.

use anyhow::Result;
use clap::Parser;
use shoplite::cli::{commands, Cli, Commands};
use shoplite::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("shoplite={},tower_http={}", log_level, log_level)
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ask { question } => {
            commands::run_ask(&question, settings).await?;
        }

        Commands::Search {
            query,
            top_k,
            threshold,
        } => {
            commands::run_search(&query, top_k, threshold, settings).await?;
        }

        Commands::Generate {
            prompt,
            max_tokens,
            temperature,
        } => {
            commands::run_generate(&prompt, max_tokens, temperature, settings).await?;
        }

        Commands::Probe { url } => {
            commands::run_probe(&url).await?;
        }

        Commands::Doctor => {
            let path = config_path.unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&settings, &path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
