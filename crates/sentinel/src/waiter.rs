//! Fixed-interval polling until a resource reaches a terminal state.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::WatchError;
use crate::provider::StatusProvider;
use crate::resource::{FinalState, PollResult, PollState, WaitOutcome, WatchedResource};

/// Hook invoked after every status query, with the 1-based poll number
/// and the observed result.
pub type PollHook = Box<dyn Fn(u32, &PollResult) + Send + Sync>;

/// Polls a [`StatusProvider`] at a fixed interval until the resource is
/// ready, fails, or the deadline passes.
///
/// The waiter suspends on the async timer between queries; it never
/// blocks a thread. One waiter watches one resource at a time - callers
/// wanting parallel watches spawn independent tasks and join them.
pub struct Waiter {
    interval: Duration,
    max_wait: Duration,
    on_poll: Option<PollHook>,
}

impl Waiter {
    /// Create a waiter with the given poll interval and deadline.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::ZeroInterval`] if `interval` is zero, and
    /// [`WatchError::MaxWaitTooShort`] if `max_wait` does not exceed
    /// `interval`. Both are rejected up front so a misconfigured wait
    /// can never hang.
    pub fn new(interval: Duration, max_wait: Duration) -> Result<Self, WatchError> {
        if interval.is_zero() {
            return Err(WatchError::ZeroInterval);
        }
        if max_wait <= interval {
            return Err(WatchError::MaxWaitTooShort { interval, max_wait });
        }
        Ok(Self {
            interval,
            max_wait,
            on_poll: None,
        })
    }

    /// Attach a hook invoked after every status query.
    #[must_use]
    pub fn with_poll_hook(mut self, hook: PollHook) -> Self {
        self.on_poll = Some(hook);
        self
    }

    /// Poll until the resource reaches a terminal state or the deadline
    /// passes.
    ///
    /// A provider error is logged and counted as one `Unknown` poll -
    /// transient blips (network, throttling) must not kill a watch that
    /// still has deadline budget left.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::EmptyIdentifier`] for an empty resource
    /// identifier. Terminal `Failed` and `TimedOut` states are ordinary
    /// [`WaitOutcome`] values.
    pub async fn wait_until_ready(
        &self,
        provider: &dyn StatusProvider,
        resource: &WatchedResource,
    ) -> Result<WaitOutcome, WatchError> {
        resource.validate()?;

        info!(
            resource = %resource,
            interval_secs = self.interval.as_secs(),
            max_wait_secs = self.max_wait.as_secs(),
            "Watching resource"
        );

        let start = Instant::now();
        let mut polls: u32 = 0;

        loop {
            let result = match provider.query_status(resource).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(resource = %resource, error = %e, "Status query failed");
                    PollResult::unknown(format!("status query failed: {e:#}"))
                }
            };
            polls += 1;

            debug!(
                resource = %resource,
                poll = polls,
                state = %result.state,
                detail = %result.detail,
                "Polled status"
            );
            if let Some(hook) = &self.on_poll {
                hook(polls, &result);
            }

            match result.state {
                PollState::Ready => {
                    let elapsed = start.elapsed();
                    info!(resource = %resource, polls, elapsed_secs = elapsed.as_secs(), "Resource ready");
                    return Ok(outcome(resource, FinalState::Ready, elapsed, polls, result.detail));
                }
                PollState::Failed => {
                    let elapsed = start.elapsed();
                    warn!(resource = %resource, polls, detail = %result.detail, "Resource failed");
                    return Ok(outcome(resource, FinalState::Failed, elapsed, polls, result.detail));
                }
                PollState::Pending | PollState::Unknown => {}
            }

            let elapsed = start.elapsed();
            if elapsed >= self.max_wait {
                warn!(
                    resource = %resource,
                    polls,
                    elapsed_secs = elapsed.as_secs(),
                    "Timed out waiting for resource"
                );
                return Ok(outcome(resource, FinalState::TimedOut, elapsed, polls, result.detail));
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

fn outcome(
    resource: &WatchedResource,
    state: FinalState,
    elapsed: Duration,
    polls: u32,
    detail: String,
) -> WaitOutcome {
    WaitOutcome {
        resource: resource.clone(),
        state,
        elapsed,
        polls,
        detail,
        verified: None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::resource::WatchedResource;

    /// Provider that replays a fixed sequence of results, then reports
    /// pending forever.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<PollResult>>>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<PollResult>>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn always_pending() -> Self {
            Self::new(vec![])
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusProvider for ScriptedProvider {
        async fn query_status(&self, _resource: &WatchedResource) -> Result<PollResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(PollResult::pending("still waiting")))
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        assert!(matches!(
            Waiter::new(secs(0), secs(10)),
            Err(WatchError::ZeroInterval)
        ));
        assert!(matches!(
            Waiter::new(secs(5), secs(2)),
            Err(WatchError::MaxWaitTooShort { .. })
        ));
        // Equal interval and deadline is a misconfiguration too.
        assert!(matches!(
            Waiter::new(secs(5), secs(5)),
            Err(WatchError::MaxWaitTooShort { .. })
        ));
        assert!(Waiter::new(secs(1), secs(10)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_empty_identifier_before_polling() {
        let provider = ScriptedProvider::always_pending();
        let waiter = Waiter::new(secs(1), secs(10)).unwrap();
        let resource = WatchedResource::stack("");

        let result = waiter.wait_until_ready(&provider, &resource).await;
        assert!(matches!(result, Err(WatchError::EmptyIdentifier)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_third_poll() {
        let provider = ScriptedProvider::new(vec![
            Ok(PollResult::pending("CREATING")),
            Ok(PollResult::pending("CREATING")),
            Ok(PollResult::ready("ACTIVE")),
        ]);
        let waiter = Waiter::new(secs(1), secs(10)).unwrap();
        let resource = WatchedResource::nodegroup("pets-cluster", "pets-nodes");

        let outcome = waiter.wait_until_ready(&provider, &resource).await.unwrap();
        assert_eq!(outcome.state, FinalState::Ready);
        assert_eq!(outcome.polls, 3);
        assert_eq!(provider.call_count(), 3);
        // Two sleeps between three polls.
        assert_eq!(outcome.elapsed, secs(2));
        assert_eq!(outcome.detail, "ACTIVE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_never_ready() {
        let provider = ScriptedProvider::always_pending();
        let waiter = Waiter::new(secs(1), secs(4)).unwrap();
        let resource = WatchedResource::service("ml", "pets-api");

        let outcome = waiter.wait_until_ready(&provider, &resource).await.unwrap();
        assert_eq!(outcome.state, FinalState::TimedOut);
        assert_eq!(outcome.elapsed, secs(4));
        // Polls at t=0..=4, then the deadline check fires.
        assert_eq!(outcome.polls, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ends_the_watch_immediately() {
        let provider = ScriptedProvider::new(vec![Ok(PollResult::failed(
            "ProgressDeadlineExceeded",
        ))]);
        let waiter = Waiter::new(secs(1), secs(10)).unwrap();
        let resource = WatchedResource::rollout("ml", "pets-api");

        let outcome = waiter.wait_until_ready(&provider, &resource).await.unwrap();
        assert_eq!(outcome.state, FinalState::Failed);
        assert_eq!(outcome.polls, 1);
        assert_eq!(outcome.elapsed, secs(0));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_errors_count_as_pending() {
        let provider = ScriptedProvider::new(vec![
            Err(anyhow::anyhow!("connection reset")),
            Err(anyhow::anyhow!("throttled")),
            Ok(PollResult::ready("ACTIVE")),
        ]);
        let waiter = Waiter::new(secs(1), secs(10)).unwrap();
        let resource = WatchedResource::nodegroup("pets-cluster", "pets-nodes");

        let outcome = waiter.wait_until_ready(&provider, &resource).await.unwrap();
        assert_eq!(outcome.state, FinalState::Ready);
        assert_eq!(outcome.polls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_on_ready_resource_is_idempotent() {
        let provider = ScriptedProvider::new(vec![
            Ok(PollResult::ready("ACTIVE")),
            Ok(PollResult::ready("ACTIVE")),
        ]);
        let waiter = Waiter::new(secs(1), secs(10)).unwrap();
        let resource = WatchedResource::nodegroup("pets-cluster", "pets-nodes");

        let first = waiter.wait_until_ready(&provider, &resource).await.unwrap();
        let second = waiter.wait_until_ready(&provider, &resource).await.unwrap();
        assert_eq!(first.state, FinalState::Ready);
        assert_eq!(second.state, FinalState::Ready);
        // One read-only query per wait, nothing else.
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_watches_run_as_independent_tasks() {
        use std::sync::Arc;

        let slow = Arc::new(ScriptedProvider::new(vec![
            Ok(PollResult::pending("CREATING")),
            Ok(PollResult::pending("CREATING")),
            Ok(PollResult::ready("ACTIVE")),
        ]));
        let fast = Arc::new(ScriptedProvider::new(vec![Ok(PollResult::ready("ACTIVE"))]));

        let slow_task = tokio::spawn({
            let provider = Arc::clone(&slow);
            async move {
                let waiter = Waiter::new(secs(1), secs(10)).unwrap();
                let resource = WatchedResource::nodegroup("pets-cluster", "pets-nodes");
                waiter
                    .wait_until_ready(provider.as_ref(), &resource)
                    .await
                    .unwrap()
            }
        });
        let fast_task = tokio::spawn({
            let provider = Arc::clone(&fast);
            async move {
                let waiter = Waiter::new(secs(1), secs(10)).unwrap();
                let resource = WatchedResource::nodegroup("pets-cluster", "gpu-nodes");
                waiter
                    .wait_until_ready(provider.as_ref(), &resource)
                    .await
                    .unwrap()
            }
        });

        let (slow_outcome, fast_outcome) = (slow_task.await.unwrap(), fast_task.await.unwrap());
        assert_eq!(slow_outcome.state, FinalState::Ready);
        assert_eq!(fast_outcome.state, FinalState::Ready);
        assert_eq!(fast_outcome.polls, 1);
        assert_eq!(slow_outcome.polls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_hook_sees_every_poll() {
        use std::sync::Arc;

        let provider = ScriptedProvider::new(vec![
            Ok(PollResult::pending("0/2 available")),
            Ok(PollResult::ready("2/2 available")),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_hook = Arc::clone(&seen);
        let waiter = Waiter::new(secs(1), secs(10))
            .unwrap()
            .with_poll_hook(Box::new(move |poll, result| {
                seen_by_hook.lock().unwrap().push((poll, result.state));
            }));
        let resource = WatchedResource::rollout("ml", "pets-api");

        waiter.wait_until_ready(&provider, &resource).await.unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![(1, PollState::Pending), (2, PollState::Ready)]);
    }
}
