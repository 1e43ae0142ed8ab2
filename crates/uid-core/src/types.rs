use serde::{Deserialize, Serialize};

/// Kind of external call, used to pick the primary and fallback model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Text-only generation (code, components, gem guides).
    Text,
    /// Image input or image output (mockups, design-to-code, analysis).
    Image,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label attached to a failed external call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Backend is overloaded or unavailable (503). Recovered by model fallback.
    Overloaded,
    /// Request throttled (429, quota, RESOURCE_EXHAUSTED). Recovered by backoff.
    RateLimited,
    /// Anything else; surfaces to the caller.
    Other,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overloaded => write!(f, "overloaded"),
            Self::RateLimited => write!(f, "rate-limited"),
            Self::Other => write!(f, "other"),
        }
    }
}
