use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::ConfigurationError;
use crate::domain::models::poll::{AttemptRecord, Outcome, PollReport, PollSpec, Verdict};

/// Callback invoked with the record of every tick
pub type AttemptObserver = Arc<dyn Fn(&AttemptRecord) + Send + Sync>;

/// Drives a predicate on a fixed interval for a bounded number of attempts.
///
/// The first tick runs immediately; the interval is only ever slept
/// *between* ticks. A satisfied tick converges at once, a hard error aborts
/// at once, and exhausting the attempt budget times out. When a
/// cancellation token is attached it is checked before every tick and raced
/// against every sleep.
///
/// The scheduler holds no per-wait state, so one instance may drive any
/// number of concurrent waits.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use kubewait::domain::models::{Outcome, PollSpec, Verdict};
/// use kubewait::services::PollScheduler;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let spec = PollSpec::new("answer", Duration::from_millis(1), 3).unwrap();
/// let report = PollScheduler::new()
///     .run(&spec, || async { Outcome::Satisfied(42) })
///     .await;
/// assert_eq!(report.verdict, Verdict::Converged(42));
/// assert_eq!(report.attempts, 1);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct PollScheduler {
    cancellation: Option<CancellationToken>,
    observer: Option<AttemptObserver>,
}

impl fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollScheduler")
            .field("cancellation", &self.cancellation)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop waiting early once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Report every tick to `observer`
    #[must_use]
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&AttemptRecord) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Validate `interval` and `max_attempts`, then run the poll.
    ///
    /// # Errors
    /// Returns [`ConfigurationError`] without invoking the predicate when
    /// either bound is zero.
    pub async fn run_with<T, F, Fut>(
        &self,
        interval: Duration,
        max_attempts: u32,
        predicate: F,
    ) -> Result<PollReport<T>, ConfigurationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let spec = PollSpec::new("condition", interval, max_attempts)?;
        Ok(self.run(&spec, predicate).await)
    }

    /// Run `predicate` according to `spec` and produce exactly one verdict.
    pub async fn run<T, F, Fut>(&self, spec: &PollSpec, mut predicate: F) -> PollReport<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let started = Instant::now();
        let max_attempts = spec.max_attempts();
        let mut last_observation: Option<String> = None;
        let mut attempts = 0u32;

        loop {
            if self.is_cancelled() {
                return cancelled_report(spec, attempts, started, last_observation);
            }

            attempts += 1;
            let outcome = predicate().await;
            let elapsed = started.elapsed();
            let status = outcome.status();

            let (verdict, observation) = match outcome {
                Outcome::Satisfied(value) => (Some(Verdict::Converged(value)), None),
                Outcome::HardError(cause) => {
                    (Some(Verdict::Aborted(cause.clone())), Some(cause))
                }
                Outcome::NotYet(observation) => {
                    if observation.is_some() {
                        last_observation.clone_from(&observation);
                    }
                    let verdict = (attempts >= max_attempts).then_some(Verdict::TimedOut);
                    (verdict, observation)
                }
            };

            self.notify(&AttemptRecord {
                attempt: attempts,
                max_attempts,
                elapsed,
                status,
                observation,
            });

            if let Some(verdict) = verdict {
                log_verdict(spec, &verdict, attempts, elapsed);
                return PollReport {
                    verdict,
                    attempts,
                    elapsed,
                    last_observation,
                };
            }

            debug!(
                description = spec.description(),
                attempt = attempts,
                max_attempts,
                elapsed = ?elapsed,
                observation = last_observation.as_deref().unwrap_or(""),
                "condition not yet satisfied, sleeping {:?}",
                spec.interval()
            );

            if let Some(token) = &self.cancellation {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        return cancelled_report(spec, attempts, started, last_observation);
                    }
                    () = sleep(spec.interval()) => {}
                }
            } else {
                sleep(spec.interval()).await;
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn notify(&self, record: &AttemptRecord) {
        if let Some(observer) = &self.observer {
            observer(record);
        }
    }
}

fn cancelled_report<T>(
    spec: &PollSpec,
    attempts: u32,
    started: Instant,
    last_observation: Option<String>,
) -> PollReport<T> {
    let elapsed = started.elapsed();
    let verdict = Verdict::Cancelled;
    log_verdict(spec, &verdict, attempts, elapsed);
    PollReport {
        verdict,
        attempts,
        elapsed,
        last_observation,
    }
}

fn log_verdict<T>(spec: &PollSpec, verdict: &Verdict<T>, attempts: u32, elapsed: Duration) {
    let description = spec.description();
    match verdict {
        Verdict::Converged(_) => {
            info!(description, attempts, elapsed = ?elapsed, "condition converged");
        }
        Verdict::TimedOut => {
            warn!(
                description,
                attempts,
                elapsed = ?elapsed,
                "condition did not converge before attempts ran out"
            );
        }
        Verdict::Aborted(cause) => {
            warn!(description, attempts, elapsed = ?elapsed, cause = %cause, "poll aborted on hard error");
        }
        Verdict::Cancelled => {
            info!(description, attempts, elapsed = ?elapsed, "poll cancelled");
        }
    }
}
