use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, error};
use uid_core::DesignerError;

use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Anything that can answer a `generateContent` call for a named model.
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

/// REST client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        debug!(model, parts = request.contents.len(), "POST generateContent");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DesignerError::Transport {
                model: model.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| DesignerError::Transport {
            model: model.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            error!(model, %status, "Gemini API returned error status");
            return Err(DesignerError::Api {
                model: model.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse generateContent response from {model}"))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
