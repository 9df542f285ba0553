//! Probe command - smoke-test a running server.

use crate::cli::Output;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

const PROBE_PROMPT: &str = "Hello, how are you?";
const PROBE_MAX_TOKENS: u32 = 50;
const PROBE_TIMEOUT_SECS: u64 = 30;

/// Run the probe command against the server at `base`.
pub async fn run_probe(base: &str) -> Result<()> {
    let base = parse_base(base)?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()?;

    Output::header(&format!("Probing {}", base));

    let health = client
        .get(base.join("health")?)
        .send()
        .await
        .with_context(|| format!("server at {} is not reachable", base))?;
    let status = health.status();
    let body: Value = health.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        Output::error(&format!("GET /health returned {}", status));
        anyhow::bail!("health check failed with {}", status);
    }
    Output::success(&format!("GET /health ({})", status));
    print_fields(&body, &["status", "llm_model", "device", "knowledge_base_size"]);

    let spinner = Output::spinner("POST /generate...");
    let generated = client
        .post(base.join("generate")?)
        .json(&json!({ "prompt": PROBE_PROMPT, "max_tokens": PROBE_MAX_TOKENS }))
        .send()
        .await;
    spinner.finish_and_clear();

    let generated = generated.context("generation request failed")?;
    let status = generated.status();
    let body: Value = generated.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        Output::error(&format!("POST /generate returned {}", status));
        print_fields(&body, &["error"]);
        anyhow::bail!("generation probe failed with {}", status);
    }
    Output::success(&format!("POST /generate ({})", status));
    print_fields(&body, &["text"]);

    Ok(())
}

/// Parse the server URL so that endpoint names join onto its path.
fn parse_base(base: &str) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid server URL: {}", base))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn print_fields(body: &Value, keys: &[&str]) {
    for key in keys {
        if let Some(value) = body.get(*key) {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Output::kv(key, &shown);
        }
    }
}
