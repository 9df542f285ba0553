//! Prompt templates for Shoplite.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Cue the grounded prompt ends with so the model continues from there.
pub const ANSWER_CUE: &str = "Answer:";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts and canned replies for the support chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Support persona and grounding instruction.
    pub persona: String,
    /// Grounded prompt; `{{persona}}`, `{{context}}` and `{{question}}` are filled in.
    pub template: String,
    /// Reply when nothing in the knowledge base is relevant.
    pub fallback: String,
    /// Reply when the generation backend fails.
    pub apology: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            persona: "You are Alex, a helpful customer support specialist at Shoplite. Answer the customer's question using only the provided context. Be friendly, professional, and concise.".to_string(),

            template: r#"{{persona}}

Context: {{context}}

Customer question: {{question}}

Answer:"#.to_string(),

            fallback: "I couldn't find information about this in Shoplite documentation. Please contact our support team for assistance.".to_string(),

            apology: "Sorry, I encountered an error generating a response.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the grounded support prompt for a question and its retrieved context.
    ///
    /// The result always ends with [`ANSWER_CUE`], even when a custom template drops it.
    pub fn grounded_prompt(&self, question: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("persona".to_string(), self.rag.persona.clone());
        vars.insert("context".to_string(), context.to_string());
        vars.insert("question".to_string(), question.to_string());

        let mut prompt = self.render_with_custom(&self.rag.template, &vars);
        if !prompt.trim_end().ends_with(ANSWER_CUE) {
            prompt.push_str("\n\n");
            prompt.push_str(ANSWER_CUE);
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.persona.is_empty());
        assert!(prompts.rag.fallback.contains("support team"));
        assert!(!prompts.rag.apology.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_grounded_prompt_layout() {
        let prompts = Prompts::default();
        let prompt = prompts.grounded_prompt("Do you ship overnight?", "Overnight ($24.99)");

        assert!(prompt.starts_with("You are Alex"));
        assert!(prompt.contains("Context: Overnight ($24.99)"));
        assert!(prompt.contains("Customer question: Do you ship overnight?"));
        assert!(prompt.ends_with(ANSWER_CUE));
    }

    #[test]
    fn test_custom_template_gets_answer_cue() {
        let mut prompts = Prompts::default();
        prompts.rag.template = "{{context}}\nQ: {{question}} ({{store}})".to_string();
        prompts.variables.insert("store".to_string(), "Shoplite".to_string());

        let prompt = prompts.grounded_prompt("hi", "ctx");
        assert_eq!(prompt, "ctx\nQ: hi (Shoplite)\n\nAnswer:");
    }

    #[test]
    fn test_load_custom_rag_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "fallback = \"Please email help@shoplite.test.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.rag.fallback, "Please email help@shoplite.test.");
        assert!(prompts.rag.template.ends_with(ANSWER_CUE));
    }
}
