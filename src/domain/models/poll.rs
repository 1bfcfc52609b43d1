//! Poll model: predicate outcomes, poll specifications and verdicts.
//!
//! A wait is described by a [`PollSpec`] and driven by a predicate that
//! returns an [`Outcome`] on every tick. The scheduler folds the outcomes
//! into exactly one [`Verdict`], reported together with the attempt count and
//! elapsed time in a [`PollReport`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigurationError;

/// Result of a single predicate invocation.
///
/// `NotYet` may carry a short observation of the current remote state
/// (for example `"2/5 replicas available"`); the last one seen is included
/// in timeout diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    /// Condition does not hold yet; keep polling.
    NotYet(Option<String>),
    /// Condition holds; stop polling and hand back the observed value.
    Satisfied(T),
    /// Unrecoverable failure; stop polling without consuming remaining attempts.
    HardError(String),
}

impl<T> Outcome<T> {
    /// Not yet satisfied, with no observation.
    pub const fn not_yet() -> Self {
        Self::NotYet(None)
    }

    /// Not yet satisfied, with an observation for diagnostics.
    pub fn waiting(observation: impl Into<String>) -> Self {
        Self::NotYet(Some(observation.into()))
    }

    /// Unrecoverable failure with the given cause.
    pub fn hard_error(cause: impl Into<String>) -> Self {
        Self::HardError(cause.into())
    }

    pub const fn status(&self) -> AttemptStatus {
        match self {
            Self::NotYet(_) => AttemptStatus::NotYet,
            Self::Satisfied(_) => AttemptStatus::Satisfied,
            Self::HardError(_) => AttemptStatus::HardError,
        }
    }
}

impl Outcome<()> {
    /// Build an outcome from a boolean check.
    pub const fn from_bool(satisfied: bool) -> Self {
        if satisfied {
            Self::Satisfied(())
        } else {
            Self::NotYet(None)
        }
    }
}

/// Kind of outcome seen on a tick, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    NotYet,
    Satisfied,
    HardError,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotYet => write!(f, "not-yet"),
            Self::Satisfied => write!(f, "satisfied"),
            Self::HardError => write!(f, "hard-error"),
        }
    }
}

/// Diagnostic record of one tick. Handed to observers, never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt index.
    pub attempt: u32,
    /// Attempt budget of the wait this tick belongs to.
    pub max_attempts: u32,
    /// Time since the wait started, measured after the predicate returned.
    pub elapsed: Duration,
    pub status: AttemptStatus,
    pub observation: Option<String>,
}

impl AttemptRecord {
    /// Whether another tick will follow this one (absent cancellation).
    pub fn is_final(&self) -> bool {
        self.status != AttemptStatus::NotYet || self.attempt >= self.max_attempts
    }
}

/// How a poll's attempt budget is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollBound {
    /// Fixed number of predicate invocations
    Attempts(u32),
    /// Wall-clock budget, converted with [`PollSpec::from_timeout`]
    Timeout(Duration),
}

impl PollBound {
    /// Resolve this bound into a validated spec
    pub fn to_poll_spec(
        self,
        description: impl Into<String>,
        interval: Duration,
    ) -> Result<PollSpec, ConfigurationError> {
        match self {
            Self::Attempts(attempts) => PollSpec::new(description, interval, attempts),
            Self::Timeout(timeout) => PollSpec::from_timeout(description, timeout, interval),
        }
    }
}

/// Immutable description of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
    description: String,
    interval: Duration,
    max_attempts: u32,
}

impl PollSpec {
    /// Create a poll spec from an interval and an attempt budget.
    ///
    /// # Errors
    /// Returns [`ConfigurationError`] if `interval` is zero or
    /// `max_attempts` is zero.
    pub fn new(
        description: impl Into<String>,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<Self, ConfigurationError> {
        let description = description.into();
        if interval.is_zero() {
            return Err(ConfigurationError::ZeroInterval { description });
        }
        if max_attempts == 0 {
            return Err(ConfigurationError::ZeroAttempts { description });
        }
        Ok(Self {
            description,
            interval,
            max_attempts,
        })
    }

    /// Create a poll spec from a wall-clock timeout.
    ///
    /// Checks run at `0, interval, 2*interval, ...` up to and including the
    /// timeout, i.e. `floor(timeout / interval) + 1` attempts.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use kubewait::domain::models::PollSpec;
    ///
    /// let spec = PollSpec::from_timeout(
    ///     "node scale down",
    ///     Duration::from_secs(600),
    ///     Duration::from_secs(60),
    /// )
    /// .unwrap();
    /// assert_eq!(spec.max_attempts(), 11);
    /// ```
    pub fn from_timeout(
        description: impl Into<String>,
        timeout: Duration,
        interval: Duration,
    ) -> Result<Self, ConfigurationError> {
        let description = description.into();
        if interval.is_zero() {
            return Err(ConfigurationError::ZeroInterval { description });
        }
        if timeout.is_zero() {
            return Err(ConfigurationError::ZeroTimeout { description });
        }
        let steps = timeout.as_nanos() / interval.as_nanos();
        let max_attempts = u32::try_from(steps)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        Self::new(description, interval, max_attempts)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on time spent sleeping between ticks.
    pub fn sleep_budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts - 1)
    }
}

impl fmt::Display for PollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}x{:?})",
            self.description, self.max_attempts, self.interval
        )
    }
}

/// Final classified outcome of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T = ()> {
    Converged(T),
    TimedOut,
    Aborted(String),
    Cancelled,
}

impl<T> Verdict<T> {
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }
}

/// Verdict of a poll together with what it cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport<T = ()> {
    pub verdict: Verdict<T>,
    /// Number of predicate invocations performed.
    pub attempts: u32,
    pub elapsed: Duration,
    /// Last observation reported by a not-yet tick, if any.
    pub last_observation: Option<String>,
}
