use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::domain::errors::{ConfigurationError, WaitFailure};
use crate::domain::models::config::WaitProfile;
use crate::domain::models::poll::{AttemptRecord, Outcome, PollBound, PollSpec, Verdict};
use crate::services::poll_scheduler::PollScheduler;

/// Successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport<T = ()> {
    /// Value handed back by the satisfied predicate
    pub value: T,
    pub attempts: u32,
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

/// Binds a named condition to a bounded poll.
///
/// The builder collects the cadence, then [`ConvergenceWaiter::wait`]
/// validates it, runs the poll and maps the verdict:
///
/// - `Converged` -> `Ok(WaitReport)`
/// - `TimedOut` -> [`WaitFailure::TimedOut`], naming the condition and budget
/// - `Aborted` -> [`WaitFailure::Aborted`], cause kept verbatim
/// - `Cancelled` -> [`WaitFailure::Cancelled`]
///
/// Invalid configuration fails before the predicate runs.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use kubewait::domain::models::Outcome;
/// use kubewait::services::ConvergenceWaiter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let report = ConvergenceWaiter::new("answer is ready")
///     .interval(Duration::from_millis(1))
///     .max_attempts(3)
///     .wait(|| async { Outcome::Satisfied(42) })
///     .await
///     .unwrap();
/// assert_eq!(report.value, 42);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConvergenceWaiter {
    description: String,
    interval: Duration,
    bound: PollBound,
    scheduler: PollScheduler,
}

impl ConvergenceWaiter {
    /// Start a waiter for `description` with a 1 second interval and a
    /// single attempt
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            interval: Duration::from_secs(1),
            bound: PollBound::Attempts(1),
            scheduler: PollScheduler::new(),
        }
    }

    /// Start a waiter whose cadence comes from a configured profile
    pub fn from_profile(description: impl Into<String>, profile: &WaitProfile) -> Self {
        Self {
            interval: profile.interval(),
            bound: profile.bound(),
            ..Self::new(description)
        }
    }

    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.bound = PollBound::Attempts(max_attempts);
        self
    }

    /// Bound the wait by wall-clock time instead of an attempt count
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.bound = PollBound::Timeout(timeout);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.scheduler = self.scheduler.with_cancellation(token);
        self
    }

    #[must_use]
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&AttemptRecord) + Send + Sync + 'static,
    {
        self.scheduler = self.scheduler.with_observer(observer);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Validated poll spec for the current settings
    pub fn poll_spec(&self) -> Result<PollSpec, ConfigurationError> {
        self.bound
            .to_poll_spec(self.description.clone(), self.interval)
    }

    /// Poll `predicate` until it converges, aborts, times out or is cancelled
    #[instrument(skip_all, fields(description = %self.description))]
    pub async fn wait<T, F, Fut>(&self, predicate: F) -> Result<WaitReport<T>, WaitFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let spec = self.poll_spec()?;
        let started_at = Utc::now();
        let report = self.scheduler.run(&spec, predicate).await;

        match report.verdict {
            Verdict::Converged(value) => Ok(WaitReport {
                value,
                attempts: report.attempts,
                elapsed: report.elapsed,
                started_at,
            }),
            Verdict::TimedOut => Err(WaitFailure::TimedOut {
                description: spec.description().to_string(),
                max_attempts: spec.max_attempts(),
                interval: spec.interval(),
                attempts: report.attempts,
                elapsed: report.elapsed,
                last_observation: report.last_observation,
            }),
            Verdict::Aborted(cause) => Err(WaitFailure::Aborted {
                description: spec.description().to_string(),
                cause,
                attempts: report.attempts,
                elapsed: report.elapsed,
            }),
            Verdict::Cancelled => Err(WaitFailure::Cancelled {
                description: spec.description().to_string(),
                attempts: report.attempts,
                elapsed: report.elapsed,
            }),
        }
    }
}

/// Wait for `description` with a fixed interval and attempt budget
pub async fn wait_for<T, F, Fut>(
    description: impl Into<String>,
    predicate: F,
    interval: Duration,
    max_attempts: u32,
) -> Result<WaitReport<T>, WaitFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    ConvergenceWaiter::new(description)
        .interval(interval)
        .max_attempts(max_attempts)
        .wait(predicate)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_converged_maps_to_ok() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let report = wait_for(
            "fat pod completion",
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Outcome::from_bool(n == 6) }
            },
            Duration::from_secs(10),
            120,
        )
        .await
        .unwrap();

        assert_eq!(report.attempts, 6);
        assert!(report.elapsed >= Duration::from_secs(50));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_names_description_and_budget() {
        let err = wait_for(
            "model deployment replicas",
            || async { Outcome::<()>::not_yet() },
            Duration::from_secs(60),
            10,
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.attempts(), 10);
        let message = err.to_string();
        assert!(message.starts_with("timeout waiting for model deployment replicas after 10x60s"));
        assert!(message.contains("10 attempts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_cause_is_propagated_verbatim() {
        let err = wait_for(
            "pod status",
            || async { Outcome::<()>::hard_error("container builder not terminated") },
            Duration::from_secs(10),
            5,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "container builder not terminated");
        assert_eq!(err.attempts(), 1);
        assert_eq!(err.description(), Some("pod status"));
    }

    #[tokio::test]
    async fn test_misconfigured_bounds_fail_fast() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let err = ConvergenceWaiter::new("anything")
            .interval(Duration::from_secs(1))
            .max_attempts(0)
            .wait(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Outcome::Satisfied(()) }
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WaitFailure::Configuration(ConfigurationError::ZeroAttempts { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bound() {
        let err = ConvergenceWaiter::new("node scale down")
            .interval(Duration::from_secs(60))
            .timeout(Duration::from_secs(600))
            .wait(|| async { Outcome::<()>::waiting("1 tainted node") })
            .await
            .unwrap_err();

        match err {
            WaitFailure::TimedOut {
                attempts,
                elapsed,
                last_observation,
                ..
            } => {
                assert_eq!(attempts, 11);
                assert!(elapsed >= Duration::from_secs(600));
                assert!(elapsed < Duration::from_secs(601));
                assert_eq!(last_observation.as_deref(), Some("1 tainted node"));
            }
            other => panic!("Expected TimedOut, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_is_distinct_from_timeout() {
        let token = CancellationToken::new();
        token.cancel();

        let err = ConvergenceWaiter::new("pod phase")
            .interval(Duration::from_secs(1))
            .max_attempts(3)
            .with_cancellation(token)
            .wait(|| async { Outcome::<()>::not_yet() })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("pod phase"));
    }

    #[test]
    fn test_from_profile() {
        let waiter = ConvergenceWaiter::from_profile("x", &WaitProfile::timeout(60, 600));
        assert_eq!(waiter.poll_spec().unwrap().max_attempts(), 11);

        let waiter = ConvergenceWaiter::from_profile("x", &WaitProfile::attempts(10, 24));
        let spec = waiter.poll_spec().unwrap();
        assert_eq!(spec.max_attempts(), 24);
        assert_eq!(spec.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_profile_agrees_with_profile_spec() {
        for (name, profile) in crate::domain::models::WaitProfiles::default().iter() {
            assert_eq!(
                ConvergenceWaiter::from_profile(name.as_str(), profile).poll_spec(),
                profile.to_poll_spec(name.as_str()),
                "profile {name}"
            );
        }

        let unbounded = WaitProfile {
            interval_secs: 5,
            max_attempts: None,
            timeout_secs: None,
        };
        assert!(matches!(
            ConvergenceWaiter::from_profile("x", &unbounded).poll_spec(),
            Err(ConfigurationError::ZeroAttempts { .. })
        ));
    }
}
