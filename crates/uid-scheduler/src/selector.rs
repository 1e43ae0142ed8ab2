use uid_config::ModelSettings;
use uid_core::OperationKind;

/// Primary model and its single alternate for one operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSelection {
    pub primary: String,
    pub fallback: String,
}

/// Read-only model table consulted by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSelector {
    text: ResourceSelection,
    image: ResourceSelection,
}

impl ResourceSelector {
    pub fn new(text: ResourceSelection, image: ResourceSelection) -> Self {
        Self { text, image }
    }

    pub fn from_models(models: &ModelSettings) -> Self {
        let selection = |kind| ResourceSelection {
            primary: models.primary(kind).to_string(),
            fallback: models.fallback(kind).to_string(),
        };
        Self::new(selection(OperationKind::Text), selection(OperationKind::Image))
    }

    pub fn selection(&self, kind: OperationKind) -> &ResourceSelection {
        match kind {
            OperationKind::Text => &self.text,
            OperationKind::Image => &self.image,
        }
    }

    /// The caller's preferred resource when given, else the primary for `kind`.
    pub fn resolve(&self, kind: OperationKind, preferred: Option<&str>) -> String {
        preferred
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.selection(kind).primary.as_str())
            .to_string()
    }

    pub fn fallback(&self, kind: OperationKind) -> &str {
        &self.selection(kind).fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_model_settings() {
        let selector = ResourceSelector::from_models(&ModelSettings::default());
        assert_eq!(selector.resolve(OperationKind::Text, None), "gemini-2.5-flash");
        assert_eq!(
            selector.resolve(OperationKind::Image, None),
            "gemini-2.5-flash-image"
        );
        assert_eq!(selector.fallback(OperationKind::Text), "gemini-2.0-flash-exp");
        assert_eq!(
            selector.fallback(OperationKind::Image),
            "gemini-3-pro-image-preview"
        );
    }

    #[test]
    fn test_preferred_overrides_primary() {
        let selector = ResourceSelector::from_models(&ModelSettings::default());
        assert_eq!(
            selector.resolve(OperationKind::Text, Some("gems/acme-ui")),
            "gems/acme-ui"
        );
        assert_eq!(
            selector.resolve(OperationKind::Text, Some("  ")),
            "gemini-2.5-flash"
        );
    }

    #[test]
    fn test_gem_id_becomes_primary() {
        let models = ModelSettings {
            gem_id: Some("gems/ui-pro".into()),
            ..ModelSettings::default()
        };
        let selector = ResourceSelector::from_models(&models);
        assert_eq!(selector.selection(OperationKind::Image).primary, "gems/ui-pro");
        assert_eq!(
            selector.selection(OperationKind::Image).fallback,
            "gemini-3-pro-image-preview"
        );
    }
}
