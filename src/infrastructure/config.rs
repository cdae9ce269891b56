// Application configuration - defaults, optional file, then environment
use crate::application::retry::RetryPolicy;
use crate::domain::dashboard::{DisplaySettings, RecordId, DEFAULT_TITLE};
use anyhow::{bail, Context};
use chrono_tz::Tz;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "https://api.data.gov.my/gtfs-realtime/vehicle-position/ktmb";
pub const DEFAULT_TASKADE_BASE_URL: &str = "https://www.taskade.com/api/v1";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub gtfsr_url: String,
    pub taskade_base_url: String,
    #[serde(default)]
    pub taskade_api_token: String,
    #[serde(default)]
    pub taskade_project_id: String,
    #[serde(default)]
    pub taskade_task_id: Option<String>,
    pub dashboard_title: String,
    pub display_timezone: String,
    /// Seconds per HTTP request
    pub http_timeout: u64,
    pub max_retries: u32,
    pub retry_initial_delay_ms: u64,
    pub retry_backoff: f64,
    pub recreate_on_stale: bool,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn existing_record(&self) -> Option<RecordId> {
        RecordId::parse(self.taskade_task_id.as_deref())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_initial_delay_ms),
            self.retry_backoff,
        )
    }

    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.display_timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid display_timezone {:?}: {}", self.display_timezone, e))
    }

    pub fn display_settings(&self) -> anyhow::Result<DisplaySettings> {
        Ok(DisplaySettings {
            title: self.dashboard_title.clone(),
            timezone: self.timezone()?,
        })
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.dry_run {
            if self.taskade_api_token.trim().is_empty() {
                bail!("TASKADE_API_TOKEN is required");
            }
            if self.taskade_project_id.trim().is_empty() {
                bail!("TASKADE_PROJECT_ID is required");
            }
        }
        if self.max_retries == 0 {
            bail!("MAX_RETRIES must be at least 1");
        }
        if !self.retry_backoff.is_finite() || self.retry_backoff < 1.0 {
            bail!("RETRY_BACKOFF must be a finite number of at least 1.0");
        }
        if self.http_timeout == 0 {
            bail!("HTTP_TIMEOUT must be at least 1 second");
        }
        self.timezone()?;
        Ok(())
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("gtfsr_url", DEFAULT_FEED_URL)?
        .set_default("taskade_base_url", DEFAULT_TASKADE_BASE_URL)?
        .set_default("dashboard_title", DEFAULT_TITLE)?
        .set_default("display_timezone", "Asia/Kuala_Lumpur")?
        .set_default("http_timeout", 20)?
        .set_default("max_retries", 3)?
        .set_default("retry_initial_delay_ms", 1000)?
        .set_default("retry_backoff", 1.5)?
        .set_default("recreate_on_stale", true)?
        .set_default("dry_run", false)
}

/// Load configuration from `config/dashboard.*` (optional) and the environment.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = defaults()?
        .add_source(File::with_name("config/dashboard").required(false))
        .add_source(Environment::default())
        .build()
        .context("Failed to read configuration")?;

    parse_app_config(settings)
}

fn parse_app_config(settings: Config) -> anyhow::Result<AppConfig> {
    let config: AppConfig = settings
        .try_deserialize()
        .context("Failed to parse configuration")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_with(overrides: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let mut builder = defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        parse_app_config(builder.build()?)
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![("taskade_api_token", "secret"), ("taskade_project_id", "proj-1")]
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&credentials()).unwrap();

        assert_eq!(config.gtfsr_url, DEFAULT_FEED_URL);
        assert_eq!(config.taskade_base_url, DEFAULT_TASKADE_BASE_URL);
        assert_eq!(config.http_timeout(), Duration::from_secs(20));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_secs(1), 1.5)
        );
        assert!(config.recreate_on_stale);
        assert!(!config.dry_run);
        assert_eq!(config.existing_record(), None);
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Kuala_Lumpur);
        assert_eq!(config.display_settings().unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_existing_record_is_trimmed() {
        let mut overrides = credentials();
        overrides.push(("taskade_task_id", "  task-123 "));
        let config = load_with(&overrides).unwrap();
        assert_eq!(config.existing_record(), RecordId::parse(Some("task-123")));

        let mut overrides = credentials();
        overrides.push(("taskade_task_id", ""));
        assert_eq!(load_with(&overrides).unwrap().existing_record(), None);
    }

    #[test]
    fn test_numeric_values_from_strings() {
        let mut overrides = credentials();
        overrides.extend([("http_timeout", "5"), ("max_retries", "7"), ("retry_backoff", "2.0")]);
        let config = load_with(&overrides).unwrap();

        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_policy().max_attempts, 7);
        assert_eq!(config.retry_policy().backoff_factor, 2.0);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = load_with(&[("taskade_project_id", "proj-1")]).unwrap_err();
        assert!(err.to_string().contains("TASKADE_API_TOKEN"));

        let err = load_with(&[("taskade_api_token", "secret")]).unwrap_err();
        assert!(err.to_string().contains("TASKADE_PROJECT_ID"));
    }

    #[test]
    fn test_dry_run_skips_credential_check() {
        let config = load_with(&[("dry_run", "true")]).unwrap();
        assert!(config.dry_run);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let mut overrides = credentials();
        overrides.push(("display_timezone", "Mars/Olympus_Mons"));
        assert!(load_with(&overrides).is_err());
    }

    #[test]
    fn test_unusable_backoff_rejected() {
        for backoff in ["0.5", "-2", "inf", "NaN"] {
            let mut overrides = credentials();
            overrides.push(("retry_backoff", backoff));
            assert!(load_with(&overrides).is_err(), "backoff {} should be rejected", backoff);
        }
    }

    #[test]
    fn test_large_retry_settings_stay_bounded() {
        let mut overrides = credentials();
        overrides.extend([("max_retries", "30"), ("retry_backoff", "10"), ("retry_initial_delay_ms", "1000")]);
        let policy = load_with(&overrides).unwrap().retry_policy();
        assert_eq!(policy.delay_after(25), crate::application::retry::MAX_RETRY_DELAY);
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut overrides = credentials();
        overrides.push(("max_retries", "0"));
        assert!(load_with(&overrides).is_err());
    }
}
