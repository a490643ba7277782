use std::time::Duration;

use anyhow::{ensure, Context};
use log::LevelFilter;
use outreach_engine::ApiSettings;
use url::Url;

use crate::cli::Cli;

/// Runtime settings, resolved once from flags and environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let api_base_url = Url::parse(cli.api_base_url.trim())
            .with_context(|| format!("invalid API base URL {:?}", cli.api_base_url))?;
        ensure!(
            matches!(api_base_url.scheme(), "http" | "https"),
            "API base URL must be http or https, got {api_base_url}"
        );
        ensure!(cli.poll_interval_ms > 0, "poll interval must be positive");
        ensure!(cli.request_timeout_secs > 0, "request timeout must be positive");

        Ok(Self {
            api_base_url,
            poll_interval: Duration::from_millis(cli.poll_interval_ms),
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
            log_level: outreach_logging::parse_level(&cli.log_level),
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        let mut settings = ApiSettings::new(self.api_base_url.clone());
        settings.request_timeout = self.request_timeout;
        settings.connect_timeout = settings.connect_timeout.min(self.request_timeout);
        settings
    }

    /// Longest silence from the engine before the driver gives up on a phase.
    ///
    /// Every poll round trip is bounded by the request timeout, so a healthy
    /// job produces an event at least this often.
    pub fn stall_timeout(&self) -> Duration {
        self.poll_interval + self.request_timeout + Duration::from_secs(5)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        let mut argv = vec!["outreach"];
        argv.extend_from_slice(args);
        argv.push("health");
        AppConfig::from_cli(&Cli::try_parse_from(argv)?)
    }

    #[test]
    fn flags_map_onto_api_settings() {
        let config = parse(&[
            "--api-base-url",
            "http://backend.local:9000/api",
            "--poll-interval-ms",
            "250",
            "--request-timeout-secs",
            "5",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.log_level, LevelFilter::Debug);

        let settings = config.api_settings();
        assert_eq!(settings.base_url.as_str(), "http://backend.local:9000/api");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_base_url_and_zero_interval() {
        assert!(parse(&["--api-base-url", "not a url"]).is_err());
        assert!(parse(&["--api-base-url", "ftp://backend.local"]).is_err());
        assert!(parse(&["--api-base-url", "http://x", "--poll-interval-ms", "0"]).is_err());
    }
}
