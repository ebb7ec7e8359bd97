//! Prompt templates for Daun.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub diagnosis: DiagnosisPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompt for RAG answer generation.
///
/// The template is rendered with `{{context}}` (the retrieved passages,
/// newline-separated) and `{{question}}` (the user's literal question).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub template: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are "HotBot", a friendly and helpful AI assistant with expertise in agriculture.
Your task is to answer farmers' questions about chili plant diseases based on the provided context from research journals.
Answer the question using only the following context:

CONTEXT:
{{context}}

QUESTION:
{{question}}

ANSWER:"#
                .to_string(),
        }
    }
}

/// Prompt for the auto-generated follow-up question after an image diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisPrompts {
    /// Rendered with `{{disease}}` = the classifier's predicted label.
    pub question: String,
}

impl Default for DiagnosisPrompts {
    fn default() -> Self {
        Self {
            question:
                "Please briefly explain the disease '{{disease}}' on chili plants and describe its main symptoms."
                    .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
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

            let diagnosis_path = custom_path.join("diagnosis.toml");
            if diagnosis_path.exists() {
                let content = std::fs::read_to_string(&diagnosis_path)?;
                prompts.diagnosis = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the follow-up question for a vision diagnosis label.
    pub fn diagnosis_question(&self, disease: &str) -> String {
        let mut vars = std::collections::HashMap::new();
        vars.insert("disease".to_string(), disease.to_string());
        self.render_with_custom(&self.diagnosis.question, &vars)
    }
}
