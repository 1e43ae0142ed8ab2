//! Persisted custom gem configuration (`{project}/.kiro/gem-config.json`).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inputs used for the last gem generation, kept so it can be regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GemConfig {
    pub gem_name: String,
    #[serde(default)]
    pub design_system_files: Vec<String>,
    #[serde(default)]
    pub codebase_examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    pub generated_at: DateTime<Utc>,
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

fn default_project_name() -> String {
    "Unknown".to_string()
}

impl GemConfig {
    /// Markdown block appended to design prompts so output follows the project.
    pub fn project_context(&self) -> String {
        let mut context = String::from("\n\n## Project Context\n");
        context.push_str(&format!("Project: {}\n", self.project_name));

        if !self.design_system_files.is_empty() {
            context.push_str(&format!(
                "Design System Files: {} files detected\n",
                self.design_system_files.len()
            ));
        }
        if !self.codebase_examples.is_empty() {
            context.push_str(&format!(
                "Component Examples: {} files detected\n",
                self.codebase_examples.len()
            ));
        }
        if let Some(instructions) = self.custom_instructions.as_deref().filter(|s| !s.is_empty()) {
            context.push_str(&format!("\nCustom Instructions:\n{instructions}\n"));
        }
        context
    }
}

/// Reads and writes the gem config for one project root.
#[derive(Debug, Clone)]
pub struct GemStore {
    root: PathBuf,
}

impl GemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(".kiro").join("gem-config.json")
    }

    /// Load the saved config. Returns `None` when no gem has been created yet.
    pub fn load(&self) -> Result<Option<GemConfig>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read gem config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse gem config: {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self, config: &GemConfig) -> Result<()> {
        let path = self.config_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(config).context("Failed to serialize gem config")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write gem config: {}", path.display()))?;
        Ok(())
    }

    /// Project context for prompts; empty when no config exists or it is unreadable.
    pub fn project_context(&self) -> String {
        match self.load() {
            Ok(Some(config)) => config.project_context(),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable gem config: {e:#}");
                String::new()
            }
        }
    }
}
