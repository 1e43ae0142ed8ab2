//! Rate-limit retry policy and per-call retry state.

use std::time::Duration;
use uid_config::ResilienceSettings;
use uid_core::Classification;

/// Bounded exponential backoff, applied to rate-limited failures only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    pub fn from_settings(settings: &ResilienceSettings) -> Self {
        Self::new(settings.max_retries, settings.initial_retry_delay())
    }

    /// `attempt` is the zero-based number of retries already performed.
    pub fn should_retry(&self, classification: Classification, attempt: u32) -> bool {
        classification == Classification::RateLimited && attempt < self.max_retries
    }

    /// `initial_delay * 2^attempt`, saturating.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// State carried across the attempts of one top-level call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryContext {
    pub attempt: u32,
    pub fallback_used: bool,
    pub resource: String,
}

impl RetryContext {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            attempt: 0,
            fallback_used: false,
            resource: resource.into(),
        }
    }

    /// Switch to the alternate resource. Does not touch the retry counter.
    pub fn use_fallback(&mut self, fallback: impl Into<String>) {
        self.resource = fallback.into();
        self.fallback_used = true;
    }
}
