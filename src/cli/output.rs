//! CLI output formatting utilities.

use crate::rag::{Confidence, RetrievalHit};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a retrieved document.
    pub fn hit(hit: &RetrievalHit) {
        println!(
            "\n{} {} ({}, distance: {:.3})",
            style(">>").green(),
            style(&hit.document.title).bold(),
            style(&hit.document.id).dim(),
            hit.distance
        );
        println!("   {}", content_preview(&hit.document.content, 200));
    }

    /// Print a confidence label, coloured by band.
    pub fn confidence(confidence: Confidence) {
        let label = match confidence {
            Confidence::High => style("high").green(),
            Confidence::Medium => style("medium").yellow(),
            Confidence::Low => style("low").red(),
        };
        Self::kv("Confidence", &label.to_string());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content,
    }
}
