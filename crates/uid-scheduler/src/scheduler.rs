//! Global FIFO admission for external calls.
//!
//! Every caller queues on one fair async mutex. The holder of the lock is the
//! only caller allowed to have an external call in flight; it keeps the lock
//! (through [`AdmissionPermit`]) until the call completes or fails. Before
//! handing out a permit the scheduler waits until `min_interval` has passed
//! since the previous call *started*, and records the new start time while
//! still holding the lock.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::clock::{Clock, TokioClock};

#[derive(Debug, Default)]
struct SchedulerState {
    last_start: Option<Instant>,
}

pub struct RequestScheduler<C: Clock = TokioClock> {
    clock: Arc<C>,
    min_interval: Duration,
    state: Mutex<SchedulerState>,
}

/// Exclusive right to perform one external call. Dropping it admits the next caller.
pub struct AdmissionPermit<'a> {
    _state: MutexGuard<'a, SchedulerState>,
    started_at: Instant,
}

impl AdmissionPermit<'_> {
    /// Time at which this call was allowed to start.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl RequestScheduler<TokioClock> {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(Arc::new(TokioClock), min_interval)
    }
}

impl<C: Clock> RequestScheduler<C> {
    pub fn with_clock(clock: Arc<C>, min_interval: Duration) -> Self {
        Self {
            clock,
            min_interval,
            state: Mutex::new(SchedulerState::default()),
        }
    }

    /// Wait for every earlier caller to finish, then for the pacing gap.
    pub async fn admit(&self) -> AdmissionPermit<'_> {
        let mut state = self.state.lock().await;

        if let Some(last_start) = state.last_start {
            let since_last = self.clock.now().saturating_duration_since(last_start);
            let wait = self.min_interval.saturating_sub(since_last);
            if !wait.is_zero() {
                info!(
                    wait_ms = wait.as_millis() as u64,
                    "Rate limiting: waiting before next request"
                );
                self.clock.sleep(wait).await;
            }
        }

        let started_at = self.clock.now();
        state.last_start = Some(started_at);
        AdmissionPermit {
            _state: state,
            started_at,
        }
    }

    /// Start time of the most recently admitted call, if any.
    pub async fn last_start(&self) -> Option<Instant> {
        self.state.lock().await.last_start
    }
}
