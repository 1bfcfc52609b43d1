//! `kubewait probe`: wait for an HTTP endpoint to answer 200 OK.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::output::progress::{attempt_observer, create_attempt_progress_bar};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::config::{Config, PROFILE_HTTP_PROBE};
use crate::infrastructure::http::HttpProbe;
use crate::services::convergence_waiter::ConvergenceWaiter;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// URL that must answer 200 OK
    pub url: String,

    /// Bearer token sent in the Authorization header
    #[arg(short, long, env = "KUBEWAIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Wait profile supplying the default cadence
    #[arg(short, long, default_value = PROFILE_HTTP_PROBE)]
    pub profile: String,

    /// Seconds between attempts (overrides the profile)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Maximum number of attempts (overrides the profile)
    #[arg(short, long)]
    pub attempts: Option<u32>,
}

#[derive(Debug, serde::Serialize)]
pub struct ProbeOutput {
    pub url: String,
    pub attempts: u32,
    pub elapsed_ms: u64,
    pub started_at: String,
    pub body: String,
}

impl CommandOutput for ProbeOutput {
    fn to_human(&self) -> String {
        format!(
            "{} answered 200 OK after {} attempt(s) ({}ms)\n{}",
            self.url,
            self.attempts,
            self.elapsed_ms,
            truncate(&self.body, 200)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Build the waiter for `args`: profile cadence first, then CLI overrides
pub fn build_waiter(args: &ProbeArgs, config: &Config) -> Result<ConvergenceWaiter> {
    let profile = config.profiles.get(&args.profile)?;
    let mut waiter = ConvergenceWaiter::from_profile(format!("{} to answer 200 OK", args.url), profile);
    if let Some(interval) = args.interval {
        waiter = waiter.interval(Duration::from_secs(interval));
    }
    if let Some(attempts) = args.attempts {
        waiter = waiter.max_attempts(attempts);
    }
    Ok(waiter)
}

pub async fn execute(args: ProbeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut probe = HttpProbe::new(args.url.clone())?;
    if let Some(ref token) = args.token {
        probe = probe.with_bearer_token(token.clone());
    }

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling wait");
            on_interrupt.cancel();
        }
    });

    let mut waiter = build_waiter(&args, config)?.with_cancellation(token);
    let max_attempts = waiter.poll_spec()?.max_attempts();

    let progress = (!json_mode).then(|| create_attempt_progress_bar(max_attempts));
    if let Some(ref pb) = progress {
        pb.set_message(format!("waiting for {}", args.url));
        waiter = waiter.with_observer(attempt_observer(pb.clone()));
    }

    let result = probe.wait(&waiter).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let report = result.with_context(|| format!("Probe of {} failed", args.url))?;

    let out = ProbeOutput {
        url: args.url,
        attempts: report.attempts,
        elapsed_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        started_at: report.started_at.to_rfc3339(),
        body: report.value,
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(interval: Option<u64>, attempts: Option<u32>) -> ProbeArgs {
        ProbeArgs {
            url: "http://model.local/health".to_string(),
            token: None,
            profile: PROFILE_HTTP_PROBE.to_string(),
            interval,
            attempts,
        }
    }

    #[test]
    fn test_build_waiter_uses_profile() {
        let spec = build_waiter(&args(None, None), &Config::default())
            .unwrap()
            .poll_spec()
            .unwrap();
        assert_eq!(spec.interval(), Duration::from_secs(3));
        assert_eq!(spec.max_attempts(), 6);
        assert!(spec.description().contains("http://model.local/health"));
    }

    #[test]
    fn test_build_waiter_overrides() {
        let spec = build_waiter(&args(Some(1), Some(30)), &Config::default())
            .unwrap()
            .poll_spec()
            .unwrap();
        assert_eq!(spec.interval(), Duration::from_secs(1));
        assert_eq!(spec.max_attempts(), 30);
    }

    #[test]
    fn test_build_waiter_unknown_profile() {
        let mut probe_args = args(None, None);
        probe_args.profile = "missing".to_string();
        assert!(build_waiter(&probe_args, &Config::default()).is_err());
    }
}
