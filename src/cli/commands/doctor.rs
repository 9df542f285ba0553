//! Doctor command - verify configuration and backend credentials.

use crate::cli::preflight::{needs_openai_key, Operation};
use crate::cli::Output;
use crate::config::{GenerationProvider, Settings};
use crate::generation::TGI_TOKEN_ENV;
use crate::knowledge::KnowledgeBase;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Shoplite Doctor");
    println!();
    println!("Checking configuration and backends...\n");

    let mut checks = Vec::new();

    println!("{}", style("Configuration").bold());
    let section = vec![check_config_file(config_path), check_settings(settings)];
    print_section(&section);
    checks.extend(section);

    println!();

    println!("{}", style("Backends").bold());
    let section = check_backends(settings);
    print_section(&section);
    checks.extend(section);

    println!();

    println!("{}", style("Knowledge Base").bold());
    let section = vec![check_knowledge_base(&KnowledgeBase::shoplite())];
    print_section(&section);
    checks.extend(section);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before starting the server.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Shoplite is ready to serve.");
    }

    Ok(())
}

fn print_section(checks: &[CheckResult]) {
    for check in checks {
        check.print();
    }
}

/// Check if the config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: shoplite config init",
        )
    }
}

/// Check the loaded settings for values the service refuses to start with.
fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            &format!(
                "top_k={}, threshold={}, bands <{} high / <{} medium",
                settings.rag.top_k,
                settings.rag.threshold,
                settings.rag.high_confidence_below,
                settings.rag.medium_confidence_below
            ),
        ),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix the value in the config file"),
    }
}

fn check_backends(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        CheckResult::ok(
            "Embedding",
            &format!("{} ({})", settings.embedding.provider, settings.embedding.model),
        ),
        CheckResult::ok(
            "Generation",
            &format!(
                "{} ({}, {} slot(s) on {})",
                settings.generation.provider,
                settings.generation.model,
                settings.generation.device_slots,
                settings.generation.device
            ),
        ),
    ];

    if needs_openai_key(Operation::Serve, settings) {
        results.push(check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()));
    }

    if settings.generation.provider == GenerationProvider::Tgi {
        results.push(check_tgi(settings));
    }

    results
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Some("") => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_tgi(settings: &Settings) -> CheckResult {
    if settings.generation.base_url.is_none() {
        return CheckResult::error(
            "Inference endpoint",
            "generation.base_url is not set",
            "Point generation.base_url at the text-generation-inference endpoint",
        );
    }
    match std::env::var(TGI_TOKEN_ENV) {
        Ok(token) if !token.is_empty() => {
            CheckResult::ok(TGI_TOKEN_ENV, "configured")
        }
        _ => CheckResult::warning(
            TGI_TOKEN_ENV,
            "not set",
            "Required for private or gated Hugging Face endpoints",
        ),
    }
}

fn check_knowledge_base(knowledge: &KnowledgeBase) -> CheckResult {
    if knowledge.is_empty() {
        CheckResult::warning(
            "Documents",
            "empty",
            "Every question will get the fallback answer",
        )
    } else {
        CheckResult::ok("Documents", &format!("{} documents", knowledge.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingProvider;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_api_key_formats() {
        assert_eq!(check_openai_api_key(None).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key(Some("")).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key(Some("abc")).status, CheckStatus::Warning);

        let ok = check_openai_api_key(Some("sk-abcdefghijklmnopqrstuvwxyz"));
        assert_eq!(ok.status, CheckStatus::Ok);
        assert!(!ok.message.contains("ghijklmnop"));
    }

    #[test]
    fn test_invalid_settings_reported() {
        let mut settings = Settings::default();
        settings.rag.top_k = 0;
        assert_eq!(check_settings(&settings).status, CheckStatus::Error);
        assert_eq!(check_settings(&Settings::default()).status, CheckStatus::Ok);
    }

    #[test]
    fn test_tgi_without_endpoint_is_error() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Ollama;
        settings.generation.provider = GenerationProvider::Tgi;

        let results = check_backends(&settings);
        assert!(results
            .iter()
            .any(|c| c.name == "Inference endpoint" && c.status == CheckStatus::Error));
        assert!(!results.iter().any(|c| c.name == "OPENAI_API_KEY"));
    }

    #[test]
    fn test_knowledge_base_size() {
        assert_eq!(check_knowledge_base(&KnowledgeBase::shoplite()).status, CheckStatus::Ok);
        let empty = KnowledgeBase::from_documents(Vec::new());
        assert_eq!(check_knowledge_base(&empty).status, CheckStatus::Warning);
    }
}
