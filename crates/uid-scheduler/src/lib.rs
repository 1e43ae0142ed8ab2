//! Request execution and resilience for Gemini calls: FIFO pacing, failure
//! classification, rate-limit backoff, overload fallback and call deadlines.

pub mod classify;
pub mod clock;
pub mod deadline;
pub mod executor;
pub mod retry;
pub mod scheduler;
pub mod selector;

pub use classify::{classify, classify_text};
pub use clock::{Clock, ManualClock, TokioClock};
pub use deadline::with_deadline;
pub use executor::ResilientExecutor;
pub use retry::{RetryContext, RetryPolicy};
pub use scheduler::{AdmissionPermit, RequestScheduler};
pub use selector::{ResourceSelection, ResourceSelector};
