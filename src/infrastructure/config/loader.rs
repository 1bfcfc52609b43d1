use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::{Config, WaitProfile};
use crate::infrastructure::logging::logger::parse_log_level;

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Namespace cannot be empty")]
    EmptyNamespace,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid interval_secs for profile '{0}': must be greater than 0")]
    ZeroInterval(String),

    #[error("Invalid max_attempts for profile '{0}': must be greater than 0")]
    ZeroAttempts(String),

    #[error("Invalid timeout_secs for profile '{0}': must be greater than 0")]
    ZeroTimeout(String),

    #[error("Profile '{0}' must set exactly one of max_attempts or timeout_secs")]
    AmbiguousBound(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .kubewait/config.yaml (project config)
    /// 3. .kubewait/local.yaml (project local overrides, optional)
    /// 4. Environment variables (KUBEWAIT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".kubewait/config.yaml"))
            .merge(Yaml::file(".kubewait/local.yaml"))
            .merge(Env::prefixed("KUBEWAIT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring
    /// environment overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("KUBEWAIT_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        if parse_log_level(&config.logging.level).is_err() {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        for (name, profile) in config.profiles.iter() {
            Self::validate_profile(name, profile)?;
        }

        Ok(())
    }

    fn validate_profile(name: &str, profile: &WaitProfile) -> Result<(), ConfigError> {
        if profile.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval(name.to_string()));
        }

        match (profile.max_attempts, profile.timeout_secs) {
            (Some(0), None) => Err(ConfigError::ZeroAttempts(name.to_string())),
            (None, Some(0)) => Err(ConfigError::ZeroTimeout(name.to_string())),
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) | (None, None) => Err(ConfigError::AmbiguousBound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{PROFILE_POD_COMPLETION, PROFILE_REPLICAS};
    use crate::infrastructure::logging::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.namespace, "default");
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_validate_empty_namespace() {
        let config = Config {
            namespace: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyNamespace)
        );
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config
            .profiles
            .insert(PROFILE_REPLICAS, WaitProfile::attempts(0, 24));

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroInterval(PROFILE_REPLICAS.to_string()))
        );
    }

    #[test]
    fn test_validate_zero_attempts_and_timeout() {
        let mut config = Config::default();
        config.profiles.insert("custom", WaitProfile::attempts(5, 0));
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroAttempts("custom".to_string()))
        );

        let mut config = Config::default();
        config.profiles.insert("custom", WaitProfile::timeout(5, 0));
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroTimeout("custom".to_string()))
        );
    }

    #[test]
    fn test_validate_ambiguous_bound() {
        let mut config = Config::default();
        config.profiles.insert(
            "both",
            WaitProfile {
                interval_secs: 5,
                max_attempts: Some(3),
                timeout_secs: Some(30),
            },
        );
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::AmbiguousBound("both".to_string()))
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "namespace: odahu-flow\nlogging:\n  level: info\n  format: json\nprofiles:\n  pod_completion:\n    interval_secs: 5\n    max_attempts: 60"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.namespace, "odahu-flow");
        assert_eq!(config.logging.level, "debug", "Override should win");
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
        assert_eq!(
            config.profiles.get(PROFILE_POD_COMPLETION).unwrap(),
            &WaitProfile::attempts(5, 60)
        );
        assert_eq!(
            config.profiles.get(PROFILE_REPLICAS).unwrap(),
            &WaitProfile::attempts(10, 24),
            "Default profiles survive a partial override"
        );
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "namespace: from-file").unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("KUBEWAIT_NAMESPACE", Some("from-env")),
                ("KUBEWAIT_PROFILES__REPLICAS__MAX_ATTEMPTS", Some("48")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.namespace, "from-env");
                assert_eq!(
                    config.profiles.get(PROFILE_REPLICAS).unwrap().max_attempts,
                    Some(48)
                );
            },
        );
    }

    #[test]
    fn test_load_from_file_rejects_invalid_profile() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "profiles:\n  replicas:\n    interval_secs: 0\n    max_attempts: 3").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("replicas"));
    }
}
