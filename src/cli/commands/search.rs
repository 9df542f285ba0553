//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::service::ServiceContext;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    top_k: Option<usize>,
    threshold: Option<f32>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'shoplite doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Indexing knowledge base...");
    let ctx = ServiceContext::new(settings).await;
    spinner.finish_and_clear();
    let ctx = ctx?;

    match ctx.search(query, top_k, threshold).await {
        Ok((hits, confidence)) => {
            if hits.is_empty() {
                Output::warning("No document is close enough to answer from.");
            } else {
                Output::success(&format!("Found {} relevant documents", hits.len()));
                for hit in &hits {
                    Output::hit(hit);
                }
                println!();
            }
            Output::confidence(confidence);
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
