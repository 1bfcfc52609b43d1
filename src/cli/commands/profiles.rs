//! `kubewait profiles`: show the configured wait cadences.

use anyhow::Result;
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::config::{Config, WaitProfile};

#[derive(Debug, serde::Serialize)]
pub struct ProfileOutput {
    pub name: String,
    pub interval_secs: u64,
    pub max_attempts: u32,
    pub timeout_secs: Option<u64>,
    /// Longest time spent sleeping between attempts
    pub budget_secs: u64,
}

impl ProfileOutput {
    fn from_profile(name: &str, profile: &WaitProfile) -> Result<Self> {
        let spec = profile.to_poll_spec(name)?;
        Ok(Self {
            name: name.to_string(),
            interval_secs: profile.interval_secs,
            max_attempts: spec.max_attempts(),
            timeout_secs: profile.timeout_secs,
            budget_secs: spec.sleep_budget().as_secs(),
        })
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ProfileListOutput {
    pub profiles: Vec<ProfileOutput>,
    pub total: usize,
}

impl CommandOutput for ProfileListOutput {
    fn to_human(&self) -> String {
        if self.profiles.is_empty() {
            return "No wait profiles configured.".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Profile").add_attribute(Attribute::Bold),
                Cell::new("Interval").add_attribute(Attribute::Bold),
                Cell::new("Attempts").add_attribute(Attribute::Bold),
                Cell::new("Timeout").add_attribute(Attribute::Bold),
                Cell::new("Budget").add_attribute(Attribute::Bold),
            ]);

        for profile in &self.profiles {
            table.add_row(vec![
                Cell::new(&profile.name),
                Cell::new(format!("{}s", profile.interval_secs)),
                Cell::new(profile.max_attempts),
                Cell::new(
                    profile
                        .timeout_secs
                        .map_or_else(|| "-".to_string(), |t| format!("{t}s")),
                ),
                Cell::new(format!("{}s", profile.budget_secs)),
            ]);
        }

        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn list_profiles(config: &Config) -> Result<ProfileListOutput> {
    let profiles = config
        .profiles
        .iter()
        .map(|(name, profile)| ProfileOutput::from_profile(name, profile))
        .collect::<Result<Vec<_>>>()?;
    Ok(ProfileListOutput {
        total: profiles.len(),
        profiles,
    })
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let out = list_profiles(config)?;
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_default_profiles() {
        let out = list_profiles(&Config::default()).unwrap();
        assert_eq!(out.total, 4);

        let scale_down = out
            .profiles
            .iter()
            .find(|p| p.name == "scale_down")
            .unwrap();
        assert_eq!(scale_down.max_attempts, 11);
        assert_eq!(scale_down.timeout_secs, Some(600));
        assert_eq!(scale_down.budget_secs, 600);

        let human = out.to_human();
        assert!(human.contains("pod_completion"));
        assert!(human.contains("1190s"));
    }
}
