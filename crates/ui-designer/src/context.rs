use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use uid_config::{GemStore, Settings};
use uid_core::OperationKind;
use uid_gemini::{GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerativeApi};
use uid_scheduler::ResilientExecutor;

/// Shared state handed to every tool handler.
///
/// One executor per process: all tool calls, however many are pending,
/// go through the same scheduler.
pub(crate) struct ToolContext {
    executor: Arc<ResilientExecutor>,
    api: Arc<dyn GenerativeApi>,
    gems: GemStore,
    image_deadline: Option<Duration>,
}

impl ToolContext {
    pub(crate) fn new(
        executor: Arc<ResilientExecutor>,
        api: Arc<dyn GenerativeApi>,
        root: impl Into<PathBuf>,
        image_deadline: Option<Duration>,
    ) -> Self {
        Self {
            executor,
            api,
            gems: GemStore::new(root),
            image_deadline,
        }
    }

    /// Build the production context. Fails when no API key is configured.
    pub(crate) fn from_settings(settings: &Settings, root: impl Into<PathBuf>) -> Result<Self> {
        let api_key = settings.require_api_key()?;
        let client = GeminiClient::new(api_key, settings.base_url.clone());
        Ok(Self::new(
            Arc::new(ResilientExecutor::from_settings(settings)),
            Arc::new(client),
            root,
            settings.resilience.image_deadline(),
        ))
    }

    pub(crate) fn root(&self) -> &Path {
        self.gems.root()
    }

    pub(crate) fn gems(&self) -> &GemStore {
        &self.gems
    }

    /// Text answer for `request`. A response without candidates yields an empty string.
    pub(crate) async fn generate_text(
        &self,
        kind: OperationKind,
        request: GenerateContentRequest,
    ) -> Result<String> {
        let request = Arc::new(request);
        let response = self
            .executor
            .execute(kind, None, |model| {
                let api = self.api.clone();
                let request = request.clone();
                async move { api.generate_content(&model, &request).await }
            })
            .await?;
        Ok(response.text())
    }

    /// Mockup generation: image model, image deadline, full response kept.
    pub(crate) async fn generate_image(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let request = Arc::new(request);
        self.executor
            .execute_with_deadline(OperationKind::Image, None, self.image_deadline, |model| {
                let api = self.api.clone();
                let request = request.clone();
                async move { api.generate_content(&model, &request).await }
            })
            .await
    }
}
