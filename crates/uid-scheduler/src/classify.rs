//! Failure classification for Gemini calls.
//!
//! Structured failures (`DesignerError` anywhere in the chain) are matched on
//! their status code, then on the API message alone. Only opaque failures are
//! matched on their whole rendered chain.
//! Overload markers are checked before rate-limit markers, so a single failure
//! never gets both labels.

use uid_core::{Classification, DesignerError};

const OVERLOAD_PATTERNS: &[&str] = &["overloaded", "unavailable", "503"];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "429",
    "resource_exhausted",
    "resource exhausted",
    "rate limit",
    "quota",
    "too many requests",
];

pub fn classify(error: &anyhow::Error) -> Classification {
    let structured = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<DesignerError>());

    match structured {
        Some(err) => classify_structured(err),
        None => classify_text(&format!("{error:#}")),
    }
}

/// Status code first, then the response body. The model id never takes part.
fn classify_structured(err: &DesignerError) -> Classification {
    match err {
        DesignerError::Api { status: 503, .. } => Classification::Overloaded,
        DesignerError::Api { status: 429, .. } => Classification::RateLimited,
        DesignerError::Api { body, .. } => classify_text(body),
        DesignerError::Transport { message, .. } => classify_text(message),
        _ => Classification::Other,
    }
}

/// Classify an opaque failure by the markers in its text. Case-insensitive.
pub fn classify_text(text: &str) -> Classification {
    let lowered = text.to_lowercase();
    if OVERLOAD_PATTERNS.iter().any(|p| lowered.contains(p)) {
        Classification::Overloaded
    } else if RATE_LIMIT_PATTERNS.iter().any(|p| lowered.contains(p)) {
        Classification::RateLimited
    } else {
        Classification::Other
    }
}
