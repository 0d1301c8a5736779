//! Environment-driven server configuration.

use chrono::NaiveDate;

use devpulse_core::sync::{RepoSpec, SyncSettings, DEFAULT_STALE_HOURS};

const DEFAULT_PORT: u16 = 3003;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_PROJECT_KEY: &str = "AAP";

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: String,
    pub github_token: Option<String>,
    pub repos: Vec<RepoSpec>,
    pub jira_base_url: Option<String>,
    pub jira_token: Option<String>,
    pub project_key: String,
    pub stale_hours: i64,
    pub pivot_date: NaiveDate,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = SyncSettings::default();

        let repos = env_trimmed("DEVPULSE_GITHUB_REPOS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(RepoSpec::parse)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            port: env_trimmed("PORT")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_dir: env_trimmed("DEVPULSE_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            github_token: env_trimmed("DEVPULSE_GITHUB_TOKEN"),
            repos,
            jira_base_url: env_trimmed("DEVPULSE_JIRA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            jira_token: env_trimmed("DEVPULSE_JIRA_TOKEN"),
            project_key: env_trimmed("DEVPULSE_JIRA_PROJECT_KEY")
                .unwrap_or_else(|| DEFAULT_PROJECT_KEY.to_string()),
            stale_hours: env_trimmed("DEVPULSE_STALE_HOURS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_STALE_HOURS),
            pivot_date: env_trimmed("DEVPULSE_PIVOT_DATE")
                .and_then(|value| NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok())
                .unwrap_or(defaults.pivot_date),
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            repos: self.repos.clone(),
            project_key: self.project_key.clone(),
            stale_hours: self.stale_hours,
            pivot_date: self.pivot_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_list_parses_comma_separated_specs() {
        let repos: Vec<RepoSpec> = "acme/widgets, acme/gadgets,broken"
            .split(',')
            .filter_map(RepoSpec::parse)
            .collect();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].full_name(), "acme/widgets");
        assert_eq!(repos[1].full_name(), "acme/gadgets");
    }
}
