//! Optional deadline around one external call.

use anyhow::anyhow;
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use uid_core::DesignerError;

use crate::clock::Clock;

/// Race `op` against `deadline`, timed by `clock`.
///
/// `None` or a zero deadline awaits `op` directly. Otherwise `op` runs on its
/// own task; when the deadline fires first the task is left running and its
/// result is discarded, and `DesignerError::TimedOut` is returned.
pub async fn with_deadline<C, T, Fut>(
    clock: &C,
    op: Fut,
    deadline: Option<Duration>,
) -> anyhow::Result<T>
where
    C: Clock,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let Some(after) = deadline.filter(|d| !d.is_zero()) else {
        return op.await;
    };

    let mut handle = tokio::spawn(op);
    tokio::select! {
        biased;
        joined = &mut handle => match joined {
            Ok(result) => result,
            Err(join_err) => Err(anyhow!("External call task failed: {join_err}")),
        },
        _ = clock.sleep(after) => {
            warn!(timeout_ms = after.as_millis() as u64, "External call timed out");
            Err(DesignerError::TimedOut { after }.into())
        }
    }
}
