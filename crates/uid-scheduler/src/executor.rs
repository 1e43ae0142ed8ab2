//! Single entry point for every Gemini call made by the tool handlers.
//!
//! Each attempt is admitted by the [`RequestScheduler`], runs under the
//! optional deadline, and releases its admission as soon as it settles. On
//! failure the classification decides the next step:
//!
//! - `Overloaded`: switch once to the fallback model for the operation kind
//! - `RateLimited`: sleep `initial * 2^attempt`, then queue again
//! - anything else, or exhausted budget: return the failure unchanged

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uid_config::Settings;
use uid_core::{Classification, OperationKind};

use crate::classify::classify;
use crate::clock::{Clock, TokioClock};
use crate::deadline::with_deadline;
use crate::retry::{RetryContext, RetryPolicy};
use crate::scheduler::RequestScheduler;
use crate::selector::ResourceSelector;

pub struct ResilientExecutor<C: Clock = TokioClock> {
    scheduler: RequestScheduler<C>,
    retry: RetryPolicy,
    selector: ResourceSelector,
    deadline: Option<Duration>,
    clock: Arc<C>,
}

impl ResilientExecutor<TokioClock> {
    pub fn from_settings(settings: &Settings) -> Self {
        let resilience = &settings.resilience;
        Self::with_clock(
            Arc::new(TokioClock),
            resilience.min_request_interval(),
            RetryPolicy::from_settings(resilience),
            ResourceSelector::from_models(&settings.models),
            resilience.deadline(),
        )
    }
}

impl<C: Clock> ResilientExecutor<C> {
    pub fn with_clock(
        clock: Arc<C>,
        min_interval: Duration,
        retry: RetryPolicy,
        selector: ResourceSelector,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            scheduler: RequestScheduler::with_clock(clock.clone(), min_interval),
            retry,
            selector,
            deadline,
            clock,
        }
    }

    /// Run `call` with the default deadline. `call` receives the model to use.
    pub async fn execute<T, F, Fut>(
        &self,
        kind: OperationKind,
        preferred: Option<&str>,
        call: F,
    ) -> anyhow::Result<T>
    where
        F: Fn(String) -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.execute_with_deadline(kind, preferred, self.deadline, call)
            .await
    }

    pub async fn execute_with_deadline<T, F, Fut>(
        &self,
        kind: OperationKind,
        preferred: Option<&str>,
        deadline: Option<Duration>,
        call: F,
    ) -> anyhow::Result<T>
    where
        F: Fn(String) -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut ctx = RetryContext::new(self.selector.resolve(kind, preferred));

        loop {
            let outcome = {
                let _permit = self.scheduler.admit().await;
                debug!(
                    %kind,
                    model = %ctx.resource,
                    attempt = ctx.attempt,
                    fallback = ctx.fallback_used,
                    "Calling Gemini"
                );
                with_deadline(self.clock.as_ref(), call(ctx.resource.clone()), deadline).await
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match classify(&err) {
                Classification::Overloaded if !ctx.fallback_used => {
                    let fallback = self.selector.fallback(kind);
                    warn!(
                        model = %ctx.resource,
                        "Model overloaded, trying fallback: {fallback}"
                    );
                    ctx.use_fallback(fallback);
                }
                classification if self.retry.should_retry(classification, ctx.attempt) => {
                    let delay = self.retry.backoff_delay(ctx.attempt);
                    warn!(
                        model = %ctx.resource,
                        "Rate limit hit, retrying in {}ms (attempt {}/{})",
                        delay.as_millis(),
                        ctx.attempt + 1,
                        self.retry.max_retries
                    );
                    self.clock.sleep(delay).await;
                    ctx.attempt += 1;
                }
                classification => {
                    debug!(%classification, attempt = ctx.attempt, "Giving up on Gemini call");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
