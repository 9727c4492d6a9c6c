//! Post-ready verification.
//!
//! A resource reporting Ready does not mean the application behind it is
//! answering yet: DNS for a fresh LoadBalancer hostname and target
//! registration both lag the Ready status. Verification absorbs that
//! window with a short, bounded retry and reports a boolean - callers
//! decide whether a false aborts the pipeline or downgrades to a warning.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Number of probe attempts before giving up.
pub const PROBE_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles per attempt (2s, 4s, 8s).
const PROBE_BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Run a probe up to [`PROBE_ATTEMPTS`] times with doubling backoff.
///
/// Returns true on the first successful attempt, false if every attempt
/// fails. Never returns an error: a probe that cannot succeed is a
/// reported outcome, not an exception.
pub async fn verify<F, Fut>(probe: F) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 1..=PROBE_ATTEMPTS {
        debug!(attempt, "Running verification probe");
        if probe().await {
            info!(attempt, "Verification probe succeeded");
            return true;
        }

        if attempt < PROBE_ATTEMPTS {
            let delay = PROBE_BACKOFF_BASE * 2u32.pow(attempt - 1);
            warn!(
                attempt,
                retry_in_secs = delay.as_secs(),
                "Verification probe failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    warn!(attempts = PROBE_ATTEMPTS, "Verification failed on all attempts");
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_attempt() {
        let attempts = AtomicU32::new(0);
        let passed = verify(|| async {
            attempts.fetch_add(1, Ordering::SeqCst) + 1 >= 2
        })
        .await;

        assert!(passed);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_after_three_attempts() {
        let attempts = AtomicU32::new(0);
        let passed = verify(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            false
        })
        .await;

        assert!(!passed);
        assert_eq!(attempts.load(Ordering::SeqCst), PROBE_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_short_circuits() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let passed = verify(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            true
        })
        .await;

        assert!(passed);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        // No backoff sleeps on the success path.
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
