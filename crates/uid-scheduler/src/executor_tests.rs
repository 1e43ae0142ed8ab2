use super::*;
use crate::clock::ManualClock;
use crate::selector::ResourceSelection;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use uid_core::DesignerError;

const PRIMARY: &str = "primary-text";
const FALLBACK: &str = "fallback-text";

fn selector() -> ResourceSelector {
    ResourceSelector::new(
        ResourceSelection {
            primary: PRIMARY.into(),
            fallback: FALLBACK.into(),
        },
        ResourceSelection {
            primary: "primary-image".into(),
            fallback: "fallback-image".into(),
        },
    )
}

fn executor(
    clock: &Arc<ManualClock>,
    interval_ms: u64,
    max_retries: u32,
) -> Arc<ResilientExecutor<ManualClock>> {
    Arc::new(ResilientExecutor::with_clock(
        clock.clone(),
        Duration::from_millis(interval_ms),
        RetryPolicy::new(max_retries, Duration::from_millis(300)),
        selector(),
        None,
    ))
}

fn api_error(status: u16) -> anyhow::Error {
    DesignerError::Api {
        model: "m".into(),
        status,
        body: String::new(),
    }
    .into()
}

/// Replays canned outcomes in order and records the model of every call.
#[derive(Default)]
struct Script {
    outcomes: Mutex<VecDeque<anyhow::Result<&'static str>>>,
    calls: Mutex<Vec<String>>,
}

impl Script {
    fn new(outcomes: Vec<anyhow::Result<&'static str>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn next(&self, model: String) -> anyhow::Result<&'static str> {
        self.calls.lock().unwrap().push(model);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok("default"))
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

async fn run(
    executor: &ResilientExecutor<ManualClock>,
    script: &Arc<Script>,
    preferred: Option<&str>,
) -> anyhow::Result<&'static str> {
    executor
        .execute(OperationKind::Text, preferred, |model| {
            let script = script.clone();
            async move { script.next(model) }
        })
        .await
}

fn ms(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_millis).collect()
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![Ok("design")]);

    let result = run(&executor(&clock, 0, 3), &script, None).await.unwrap();
    assert_eq!(result, "design");
    assert_eq!(script.calls(), vec![PRIMARY]);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_two_simultaneous_calls_are_spaced_by_interval() {
    let clock = Arc::new(ManualClock::new());
    let exec = executor(&clock, 100, 3);
    let starts = Arc::new(Mutex::new(Vec::<Instant>::new()));

    let submit = || {
        let starts = starts.clone();
        let clock = clock.clone();
        let exec = exec.clone();
        async move {
            exec.execute(OperationKind::Text, None, move |_| {
                let starts = starts.clone();
                let clock = clock.clone();
                async move {
                    starts.lock().unwrap().push(clock.now());
                    Ok::<_, anyhow::Error>(())
                }
            })
            .await
        }
    };

    let (a, b) = tokio::join!(submit(), submit());
    a.unwrap();
    b.unwrap();

    let starts = starts.lock().unwrap().clone();
    assert_eq!(starts.len(), 2);
    assert!(starts[1] - starts[0] >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_concurrent_calls_never_overlap_and_respect_interval() {
    let clock = Arc::new(ManualClock::new());
    let exec = executor(&clock, 100, 3);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let starts = Arc::new(Mutex::new(Vec::<Instant>::new()));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..6u64 {
        let exec = exec.clone();
        let clock = clock.clone();
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        let starts = starts.clone();
        tasks.spawn(async move {
            exec.execute(OperationKind::Text, None, move |_| {
                let clock = clock.clone();
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                let starts = starts.clone();
                async move {
                    starts.lock().unwrap().push(clock.now());
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    // Call latency varies; some calls outlast the interval.
                    clock.sleep(Duration::from_millis(40 * i)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>(())
                }
            })
            .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(peak.load(Ordering::SeqCst), 1);
    let starts = starts.lock().unwrap().clone();
    assert_eq!(starts.len(), 6);
    for pair in starts.windows(2) {
        assert!(pair[1] >= pair[0]);
        assert!(pair[1] - pair[0] >= Duration::from_millis(100));
    }
}

#[tokio::test]
async fn test_rate_limited_retries_with_exponential_backoff() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new((0..4).map(|_| Err(api_error(429))).collect());

    let err = run(&executor(&clock, 0, 3), &script, None)
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<DesignerError>().unwrap().status_code(), Some(429));
    assert_eq!(script.calls().len(), 4);
    assert_eq!(clock.sleeps(), ms(&[300, 600, 1200]));
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![Err(api_error(429)), Ok("ok")]);

    let result = run(&executor(&clock, 0, 3), &script, None).await.unwrap();
    assert_eq!(result, "ok");
    assert_eq!(script.calls(), vec![PRIMARY, PRIMARY]);
    assert_eq!(clock.sleeps(), ms(&[300]));
}

#[tokio::test]
async fn test_zero_retries_propagates_rate_limit_immediately() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![Err(api_error(429))]);

    assert!(run(&executor(&clock, 0, 0), &script, None).await.is_err());
    assert_eq!(script.calls().len(), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_overloaded_switches_to_fallback() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![Err(api_error(503)), Ok("from fallback")]);

    let result = run(&executor(&clock, 0, 3), &script, None).await.unwrap();
    assert_eq!(result, "from fallback");
    assert_eq!(script.calls(), vec![PRIMARY, FALLBACK]);
    // Substitution does not back off.
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_fallback_overloaded_is_terminal() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![
        Err(api_error(503)),
        Err(anyhow::anyhow!("The model is overloaded")),
        Ok("never"),
    ]);

    let err = run(&executor(&clock, 0, 3), &script, None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The model is overloaded");
    assert_eq!(script.calls(), vec![PRIMARY, FALLBACK]);
}

#[tokio::test]
async fn test_rate_limits_on_fallback_keep_full_retry_budget() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![
        Err(api_error(503)),
        Err(api_error(429)),
        Err(api_error(429)),
        Err(api_error(429)),
        Ok("finally"),
    ]);

    let result = run(&executor(&clock, 0, 3), &script, None).await.unwrap();
    assert_eq!(result, "finally");
    assert_eq!(
        script.calls(),
        vec![PRIMARY, FALLBACK, FALLBACK, FALLBACK, FALLBACK]
    );
    assert_eq!(clock.sleeps(), ms(&[300, 600, 1200]));
}

#[tokio::test]
async fn test_overload_after_retries_still_gets_one_fallback() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![
        Err(api_error(429)),
        Err(api_error(503)),
        Err(api_error(503)),
    ]);

    assert!(run(&executor(&clock, 0, 3), &script, None).await.is_err());
    assert_eq!(script.calls(), vec![PRIMARY, PRIMARY, FALLBACK]);
    assert_eq!(clock.sleeps(), ms(&[300]));
}

#[tokio::test]
async fn test_other_failure_is_not_retried() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![Err(api_error(400)), Ok("never")]);

    let err = run(&executor(&clock, 0, 3), &script, None)
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<DesignerError>().unwrap().status_code(), Some(400));
    assert_eq!(script.calls().len(), 1);
}

#[tokio::test]
async fn test_preferred_resource_is_used_first() {
    let clock = Arc::new(ManualClock::new());
    let script = Script::new(vec![Err(api_error(503)), Ok("ok")]);

    run(&executor(&clock, 0, 3), &script, Some("gems/acme"))
        .await
        .unwrap();
    assert_eq!(script.calls(), vec!["gems/acme", FALLBACK]);
}

#[tokio::test]
async fn test_image_kind_uses_image_models() {
    let clock = Arc::new(ManualClock::new());
    let exec = executor(&clock, 0, 3);
    let script = Script::new(vec![Err(api_error(503)), Ok("png")]);

    exec.execute(OperationKind::Image, None, |model| {
        let script = script.clone();
        async move { script.next(model) }
    })
    .await
    .unwrap();
    assert_eq!(script.calls(), vec!["primary-image", "fallback-image"]);
}

#[tokio::test]
async fn test_retry_requeues_behind_newer_submission() {
    let clock = Arc::new(ManualClock::new());
    let exec = executor(&clock, 0, 3);
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));
    let a_failed = Arc::new(AtomicUsize::new(0));

    let a = {
        let exec = exec.clone();
        let order = order.clone();
        let a_failed = a_failed.clone();
        tokio::spawn(async move {
            exec.execute(OperationKind::Text, None, move |_| {
                let order = order.clone();
                let a_failed = a_failed.clone();
                async move {
                    order.lock().unwrap().push("A");
                    if a_failed.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(api_error(429))
                    } else {
                        Ok(())
                    }
                }
            })
            .await
        })
    };
    let b = {
        let exec = exec.clone();
        let order = order.clone();
        tokio::spawn(async move {
            exec.execute(OperationKind::Text, None, move |_| {
                let order = order.clone();
                async move {
                    order.lock().unwrap().push("B");
                    Ok::<_, anyhow::Error>(())
                }
            })
            .await
        })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "A"]);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expiry_is_terminal() {
    let exec = ResilientExecutor::with_clock(
        Arc::new(TokioClock),
        Duration::ZERO,
        RetryPolicy::new(3, Duration::from_millis(300)),
        selector(),
        Some(Duration::from_millis(100)),
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let start = tokio::time::Instant::now();

    let err = exec
        .execute(OperationKind::Text, None, |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, anyhow::Error>("late")
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DesignerError>(),
        Some(DesignerError::TimedOut { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_explicit_deadline_overrides_default() {
    let exec = ResilientExecutor::with_clock(
        Arc::new(TokioClock),
        Duration::ZERO,
        RetryPolicy::new(3, Duration::from_millis(300)),
        selector(),
        Some(Duration::from_millis(100)),
    );

    let result = exec
        .execute_with_deadline(OperationKind::Image, None, None, |model| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, anyhow::Error>(model)
        })
        .await
        .unwrap();
    assert_eq!(result, "primary-image");
}

#[tokio::test]
async fn test_deadline_runs_on_injected_clock() {
    let clock = Arc::new(ManualClock::new());
    let exec = ResilientExecutor::with_clock(
        clock.clone(),
        Duration::ZERO,
        RetryPolicy::new(3, Duration::from_millis(300)),
        selector(),
        Some(Duration::from_millis(2_000)),
    );

    let err = exec
        .execute(OperationKind::Text, None, |_| {
            std::future::pending::<anyhow::Result<&'static str>>()
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DesignerError>(),
        Some(DesignerError::TimedOut { .. })
    ));
    assert_eq!(clock.sleeps(), ms(&[2_000]));
}
