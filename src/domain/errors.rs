//! Domain errors for convergence waiting.

use std::time::Duration;

use thiserror::Error;

/// Invalid poll configuration. Raised before any predicate invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid poll interval for '{description}': must be greater than zero")]
    ZeroInterval { description: String },

    #[error("Invalid max_attempts for '{description}': must be at least 1")]
    ZeroAttempts { description: String },

    #[error("Invalid timeout for '{description}': must be greater than zero")]
    ZeroTimeout { description: String },

    #[error("Unknown wait profile: {0}")]
    UnknownProfile(String),
}

/// Why a wait did not converge.
///
/// Every variant except [`WaitFailure::Aborted`] renders a message that names
/// the condition and the budget consumed. `Aborted` renders the predicate's
/// cause verbatim so the original failure signal stays recognizable; the
/// description and budget are still available as fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WaitFailure {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(
        "timeout waiting for {description} after {max_attempts}x{interval:?} ({attempts} attempts, {elapsed:?} elapsed){}",
        format_observation(.last_observation)
    )]
    TimedOut {
        description: String,
        max_attempts: u32,
        interval: Duration,
        attempts: u32,
        elapsed: Duration,
        last_observation: Option<String>,
    },

    #[error("{cause}")]
    Aborted {
        description: String,
        cause: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("cancelled waiting for {description} after {attempts} attempts ({elapsed:?} elapsed)")]
    Cancelled {
        description: String,
        attempts: u32,
        elapsed: Duration,
    },
}

impl WaitFailure {
    /// The condition this failure belongs to, if it got as far as polling.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Configuration(_) => None,
            Self::TimedOut { description, .. }
            | Self::Aborted { description, .. }
            | Self::Cancelled { description, .. } => Some(description),
        }
    }

    /// Number of predicate invocations made before failing.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Configuration(_) => 0,
            Self::TimedOut { attempts, .. }
            | Self::Aborted { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

fn format_observation(observation: &Option<String>) -> String {
    observation
        .as_ref()
        .map(|obs| format!("; last observation: {obs}"))
        .unwrap_or_default()
}
