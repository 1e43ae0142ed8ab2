use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DesignerError {
    #[error("GEMINI_API_KEY or GOOGLE_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("Gemini API error {status} from model '{model}': {body}")]
    Api {
        model: String,
        status: u16,
        body: String,
    },

    #[error("Request to model '{model}' failed: {message}")]
    Transport { model: String, message: String },

    #[error("Request timed out after {}ms", .after.as_millis())]
    TimedOut { after: Duration },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Failed to read image file: {path}. Error: {message}")]
    ImageRead { path: String, message: String },
}

impl DesignerError {
    /// HTTP status carried by the failure, when the API returned one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_missing_api_key() {
        assert_eq!(
            DesignerError::MissingApiKey.to_string(),
            "GEMINI_API_KEY or GOOGLE_API_KEY environment variable is required"
        );
    }

    #[test]
    fn test_display_api_error() {
        let err = DesignerError::Api {
            model: "gemini-2.5-flash".into(),
            status: 503,
            body: "The model is overloaded".into(),
        };
        assert_eq!(
            err.to_string(),
            "Gemini API error 503 from model 'gemini-2.5-flash': The model is overloaded"
        );
    }

    #[test]
    fn test_display_timed_out() {
        let err = DesignerError::TimedOut {
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
    }

    #[test]
    fn test_display_unknown_tool() {
        let err = DesignerError::UnknownTool("paint".into());
        assert_eq!(err.to_string(), "Unknown tool: paint");
    }

    #[test]
    fn test_display_invalid_arguments() {
        let err = DesignerError::InvalidArguments {
            tool: "design_to_code".into(),
            message: "missing field `imageData`".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid arguments for 'design_to_code': missing field `imageData`"
        );
    }

    #[test]
    fn test_display_image_read() {
        let err = DesignerError::ImageRead {
            path: "mockups/home.png".into(),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read image file: mockups/home.png. Error: No such file or directory"
        );
    }

    #[test]
    fn test_status_code_only_for_api_errors() {
        let api = DesignerError::Api {
            model: "m".into(),
            status: 429,
            body: String::new(),
        };
        assert_eq!(api.status_code(), Some(429));
        assert_eq!(
            DesignerError::TimedOut {
                after: Duration::from_secs(1)
            }
            .status_code(),
            None
        );
    }
}
