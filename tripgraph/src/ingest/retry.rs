use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::TripLoadError;

/// Startup-wait behavior for the load pipeline. The store can take a while
/// to come up, so the whole load is retried on a fixed interval until the
/// attempt budget is spent. Failures are not differentiated; the last error
/// propagates once the budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(10),
        }
    }
}

/// runs `operation` until it succeeds or the attempt budget is spent,
/// sleeping `policy.interval` between attempts. the `cancelled` flag is
/// checked before every attempt so a caller can abort the startup wait
/// deterministically.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    cancelled: &AtomicBool,
    mut operation: F,
) -> Result<T, TripLoadError>
where
    F: FnMut() -> Result<T, TripLoadError>,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = TripLoadError::Cancelled;
    for attempt in 1..=attempts {
        if cancelled.load(Ordering::Relaxed) {
            return Err(TripLoadError::Cancelled);
        }
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::warn!("(Attempt {attempt}/{attempts}) Error: {e}");
                last_error = e;
            }
        }
        if attempt < attempts {
            std::thread::sleep(policy.interval);
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::{run_with_retry, RetryPolicy};
    use crate::ingest::TripLoadError;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            interval: Duration::from_millis(0),
        }
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let cancelled = AtomicBool::new(false);
        let mut calls = 0;
        let result = run_with_retry(&fast_policy(5), &cancelled, || {
            calls += 1;
            if calls < 3 {
                Err(TripLoadError::InvalidUserInput(String::from("not ready")))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_budget_is_spent_and_last_error_propagates() {
        let cancelled = AtomicBool::new(false);
        let mut calls = 0;
        let result: Result<(), _> = run_with_retry(&fast_policy(4), &cancelled, || {
            calls += 1;
            Err(TripLoadError::InvalidUserInput(format!("attempt {calls}")))
        });
        assert_eq!(calls, 4);
        match result {
            Err(TripLoadError::InvalidUserInput(msg)) => assert_eq!(msg, "attempt 4"),
            other => panic!("expected the last error, got {other:?}"),
        }
    }

    #[test]
    fn test_cancellation_stops_before_the_next_attempt() {
        let cancelled = AtomicBool::new(false);
        let mut calls = 0;
        let result: Result<(), _> = run_with_retry(&fast_policy(10), &cancelled, || {
            calls += 1;
            cancelled.store(true, Ordering::Relaxed);
            Err(TripLoadError::InvalidUserInput(String::from("not ready")))
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(TripLoadError::Cancelled)));
    }

    #[test]
    fn test_pre_cancelled_never_runs() {
        let cancelled = AtomicBool::new(true);
        let mut calls = 0;
        let result: Result<(), _> = run_with_retry(&fast_policy(3), &cancelled, || {
            calls += 1;
            Ok(())
        });
        assert_eq!(calls, 0);
        assert!(matches!(result, Err(TripLoadError::Cancelled)));
    }
}
