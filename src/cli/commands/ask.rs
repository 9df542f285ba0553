//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::service::ServiceContext;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'shoplite doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Indexing knowledge base...");
    let ctx = ServiceContext::new(settings).await;
    spinner.finish_and_clear();
    let ctx = ctx?;

    let spinner = Output::spinner("Thinking...");
    let answer = ctx.chat(question).await;
    spinner.finish_and_clear();

    match answer {
        Ok(answer) => {
            println!("\n{}\n", answer.answer);
            Output::confidence(answer.confidence);
            if !answer.sources.is_empty() {
                Output::header("Sources");
                for source in &answer.sources {
                    Output::list_item(source);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
