//! Server settings for the UI designer MCP server.
//!
//! Resolution order, highest first:
//! - `GEMINI_*` environment variables (plus `GOOGLE_API_KEY` for the key)
//! - `~/.config/ui-designer-mcp/config.toml`
//! - built-in defaults
//!
//! Numeric environment values that fail to parse are ignored with a warning,
//! keeping whatever the lower layer provided.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use uid_core::{DesignerError, OperationKind};

/// XDG app name for the settings file.
pub const APP_NAME: &str = "ui-designer-mcp";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const FALLBACK_TEXT_MODEL: &str = "gemini-2.0-flash-exp";
pub const FALLBACK_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gemini API key. Normally supplied through the environment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub base_url: String,
    pub models: ModelSettings,
    pub resilience: ResilienceSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: ModelSettings::default(),
            resilience: ResilienceSettings::default(),
        }
    }
}

/// Primary and fallback model per operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Custom gem id. When set it replaces both primary models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gem_id: Option<String>,
    pub text: String,
    pub image: String,
    pub text_fallback: String,
    pub image_fallback: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            gem_id: None,
            text: DEFAULT_TEXT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
            text_fallback: FALLBACK_TEXT_MODEL.to_string(),
            image_fallback: FALLBACK_IMAGE_MODEL.to_string(),
        }
    }
}

impl ModelSettings {
    pub fn primary(&self, kind: OperationKind) -> &str {
        if let Some(gem) = self.gem_id.as_deref().filter(|g| !g.is_empty()) {
            return gem;
        }
        match kind {
            OperationKind::Text => &self.text,
            OperationKind::Image => &self.image,
        }
    }

    pub fn fallback(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Text => &self.text_fallback,
            OperationKind::Image => &self.image_fallback,
        }
    }
}

/// Pacing, retry and deadline knobs. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    /// Minimum spacing between the starts of consecutive API calls. 0 disables pacing.
    pub min_request_interval_ms: u64,
    /// Rate-limit retries per call.
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub initial_retry_delay_ms: u64,
    /// Per-call deadline. 0 disables it.
    pub timeout_ms: u64,
    /// Deadline for image generation calls. 0 disables it.
    pub image_timeout_ms: u64,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            min_request_interval_ms: 50,
            max_retries: 3,
            initial_retry_delay_ms: 300,
            timeout_ms: 0,
            image_timeout_ms: 120_000,
        }
    }
}

impl ResilienceSettings {
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        non_zero_millis(self.timeout_ms)
    }

    pub fn image_deadline(&self) -> Option<Duration> {
        non_zero_millis(self.image_timeout_ms)
    }
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Settings {
    /// Load the settings file (if present) and apply process environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::config_path() {
            Ok(path) => Self::load_file(&path)?,
            Err(_) => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Read a TOML settings file. A missing file yields the defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Path to the settings file: `~/.config/ui-designer-mcp/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            self.api_key = key;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(gem) = get("GEMINI_GEM_ID") {
            self.models.gem_id = Some(gem);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.models.text = model;
        }
        if let Some(model) = get("GEMINI_IMAGE_MODEL") {
            self.models.image = model;
        }
        if let Some(model) = get("GEMINI_FALLBACK_MODEL") {
            self.models.text_fallback = model;
        }
        if let Some(model) = get("GEMINI_FALLBACK_IMAGE_MODEL") {
            self.models.image_fallback = model;
        }

        let r = &mut self.resilience;
        override_number(&get, "GEMINI_MIN_REQUEST_INTERVAL", &mut r.min_request_interval_ms);
        override_number(&get, "GEMINI_MAX_RETRIES", &mut r.max_retries);
        override_number(&get, "GEMINI_INITIAL_RETRY_DELAY", &mut r.initial_retry_delay_ms);
        override_number(&get, "GEMINI_TIMEOUT", &mut r.timeout_ms);
        override_number(&get, "GEMINI_IMAGE_TIMEOUT", &mut r.image_timeout_ms);
    }

    /// API key, or `MissingApiKey` when neither variable was set.
    pub fn require_api_key(&self) -> Result<&str, DesignerError> {
        if self.api_key.is_empty() {
            Err(DesignerError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    pub fn redacted_api_key(&self) -> String {
        mask_api_key(&self.api_key)
    }

    pub fn redacted_for_display(&self) -> Self {
        let mut redacted = self.clone();
        redacted.api_key = redacted.redacted_api_key();
        redacted
    }
}

fn override_number<G, T>(get: &G, key: &str, slot: &mut T)
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = get(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => warn!(key, value = %raw, "Ignoring unparseable numeric setting"),
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.redacted_api_key())
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("resilience", &self.resilience)
            .finish()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.resilience;
        write!(
            f,
            "api_key=\"{}\", text={}, image={}, interval={}ms, retries={}, retry_delay={}ms, timeout={}ms",
            self.redacted_api_key(),
            self.models.primary(OperationKind::Text),
            self.models.primary(OperationKind::Image),
            r.min_request_interval_ms,
            r.max_retries,
            r.initial_retry_delay_ms,
            r.timeout_ms,
        )
    }
}

fn mask_api_key(api_key: &str) -> String {
    if api_key.is_empty() {
        return String::new();
    }

    let char_count = api_key.chars().count();
    let prefix: String = api_key.chars().take(3).collect();
    let suffix: String = api_key.chars().skip(char_count.saturating_sub(4)).collect();

    if char_count <= 4 {
        format!("***{suffix}")
    } else {
        format!("{prefix}...{suffix}")
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
