use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigurationError;
use crate::domain::models::poll::{PollBound, PollSpec};

/// Profile name used by pod phase and container waits
pub const PROFILE_POD_COMPLETION: &str = "pod_completion";
/// Profile name used by replica-count waits
pub const PROFILE_REPLICAS: &str = "replicas";
/// Profile name used by node scale-down waits
pub const PROFILE_SCALE_DOWN: &str = "scale_down";
/// Profile name used by HTTP readiness probes
pub const PROFILE_HTTP_PROBE: &str = "http_probe";

/// Main configuration structure for kubewait
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Default namespace for namespaced lookups
    pub namespace: String,

    /// Logging configuration
    pub logging: LogConfig,

    /// Named poll cadences
    pub profiles: WaitProfiles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            logging: LogConfig::default(),
            profiles: WaitProfiles::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stderr)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Enable stderr logging
    #[serde(default = "default_true")]
    pub enable_stderr: bool,

    /// Log rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            enable_stderr: true,
            rotation: RotationPolicy::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}

const fn default_true() -> bool {
    true
}

/// Poll cadence bound either by attempt count or by wall-clock timeout.
///
/// Exactly one of `max_attempts` and `timeout_secs` must be set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitProfile {
    /// Seconds between ticks
    pub interval_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl WaitProfile {
    pub const fn attempts(interval_secs: u64, max_attempts: u32) -> Self {
        Self {
            interval_secs,
            max_attempts: Some(max_attempts),
            timeout_secs: None,
        }
    }

    pub const fn timeout(interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            interval_secs,
            max_attempts: None,
            timeout_secs: Some(timeout_secs),
        }
    }

    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Budget of this profile.
    ///
    /// A timeout takes effect only when no attempt count is set. A profile
    /// with neither bound resolves to zero attempts, which every consumer
    /// rejects.
    pub const fn bound(&self) -> PollBound {
        match (self.max_attempts, self.timeout_secs) {
            (Some(attempts), _) => PollBound::Attempts(attempts),
            (None, Some(timeout)) => PollBound::Timeout(Duration::from_secs(timeout)),
            (None, None) => PollBound::Attempts(0),
        }
    }

    /// Build a poll spec for the given condition
    pub fn to_poll_spec(
        &self,
        description: impl Into<String>,
    ) -> Result<PollSpec, ConfigurationError> {
        self.bound().to_poll_spec(description, self.interval())
    }
}

/// Named wait profiles, keyed by profile name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WaitProfiles(pub BTreeMap<String, WaitProfile>);

impl Default for WaitProfiles {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            PROFILE_POD_COMPLETION.to_string(),
            WaitProfile::attempts(10, 120),
        );
        profiles.insert(PROFILE_REPLICAS.to_string(), WaitProfile::attempts(10, 24));
        profiles.insert(PROFILE_SCALE_DOWN.to_string(), WaitProfile::timeout(60, 600));
        profiles.insert(PROFILE_HTTP_PROBE.to_string(), WaitProfile::attempts(3, 6));
        Self(profiles)
    }
}

impl WaitProfiles {
    pub fn get(&self, name: &str) -> Result<&WaitProfile, ConfigurationError> {
        self.0
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownProfile(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: WaitProfile) {
        self.0.insert(name.into(), profile);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WaitProfile)> {
        self.0.iter()
    }
}
