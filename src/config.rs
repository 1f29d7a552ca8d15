use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.golemio.cz/v2";

/// Live map of Prague public transit vehicles.
#[derive(Parser, Debug, Clone)]
#[command(name = "prague-live", version, about)]
pub struct Config {
    /// Golemio access token, sent as `X-Access-Token`.
    #[arg(long, env = "GOLEMIO_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "GOLEMIO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds between two vehicle polls.
    #[arg(long, default_value_t = 10)]
    pub poll_interval_secs: u64,

    #[arg(long, default_value_t = 8)]
    pub request_timeout_secs: u64,

    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Static GTFS `routes.txt` to style markers from instead of the routes endpoint.
    #[arg(long)]
    pub routes_file: Option<PathBuf>,

    /// Log as JSON lines on stderr.
    #[arg(long)]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            poll_interval_secs: 10,
            request_timeout_secs: 8,
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            routes_file: None,
            log_json: false,
        }
    }
}

impl Config {
    pub fn validate(self) -> Result<Self> {
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll interval must be at least one second".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request timeout must be at least one second".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base url must not be empty".into()));
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let config = Config::try_parse_from(["prague-live"]).unwrap();

        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.bind, Config::default().bind);
        assert!(config.routes_file.is_none());
    }

    #[test]
    fn parses_flags() {
        let config = Config::try_parse_from([
            "prague-live",
            "--api-key",
            "secret",
            "--base-url",
            "http://localhost:9000/v2/",
            "--poll-interval-secs",
            "3",
            "--routes-file",
            "gtfs/routes.txt",
        ])
        .unwrap()
        .validate()
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.poll_interval_secs, 3);
        assert_eq!(
            config.endpoint("vehiclepositions"),
            "http://localhost:9000/v2/vehiclepositions"
        );
        assert_eq!(config.routes_file, Some(PathBuf::from("gtfs/routes.txt")));
    }

    #[test]
    fn rejects_zero_interval() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_base_url() {
        let config = Config {
            base_url: "  ".into(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
