//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::generation::{create_generator, generate_text, GenerationRequest};
use anyhow::Result;

/// Run the generate command.
///
/// Talks to the generation backend directly; the knowledge base is not indexed.
pub async fn run_generate(
    prompt: &str,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'shoplite doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let defaults = &settings.generation;
    let request = GenerationRequest::new(
        prompt,
        max_tokens.unwrap_or(defaults.default_max_tokens),
        temperature.unwrap_or(defaults.default_temperature),
        defaults.max_tokens_limit,
    )?;
    let generator = create_generator(defaults)?;

    let spinner = Output::spinner(&format!("Generating with {}...", generator.model()));
    let text = generate_text(generator.as_ref(), &request).await;
    spinner.finish_and_clear();

    match text {
        Ok(text) => println!("{}", text),
        Err(e) => {
            Output::error(&format!("Generation failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
