//! Client configuration parsed from environment variables.

use std::time::Duration;

use crate::net::poll::{DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS, PollOptions};

pub const DEFAULT_DEV_ORIGIN: &str = "http://localhost:3000";
pub const DEV_PROXY_PATH: &str = "/api/proxy";
pub const DEFAULT_PRODUCTION_API_BASE: &str = "https://ozqiu4g1m7.execute-api.us-east-1.amazonaws.com/Prod";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown MINDMAP_ENV: {0} (expected 'development' or 'production')")]
    UnknownEnvironment(String),

    #[error("invalid {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Build environment; selects between the dev proxy and the production endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub environment: Environment,
    pub base_url: String,
    pub poll: PollOptions,
    /// `MINDMAP_DEV_ORIGIN`, kept so a later environment switch still honors it.
    pub dev_origin: Option<String>,
    /// `MINDMAP_API_BASE`, likewise.
    pub api_base: Option<String>,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `MINDMAP_ENV`: `development` (default) or `production`
    /// - `MINDMAP_DEV_ORIGIN`: origin hosting the dev proxy, default `http://localhost:3000`
    /// - `MINDMAP_API_BASE`: production API base URL
    /// - `MINDMAP_POLL_MAX_ATTEMPTS`: default 30
    /// - `MINDMAP_POLL_INTERVAL_MS`: default 2000
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown environment or a non-numeric poll setting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env_string("MINDMAP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };
        let dev_origin = env_string("MINDMAP_DEV_ORIGIN");
        let api_base = env_string("MINDMAP_API_BASE");
        let base_url = resolve_base_url(environment, dev_origin.as_deref(), api_base.as_deref());
        let poll = PollOptions {
            max_attempts: env_parse("MINDMAP_POLL_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            interval: Duration::from_millis(env_parse("MINDMAP_POLL_INTERVAL_MS", DEFAULT_INTERVAL_MS)?),
        };

        Ok(Self { environment, base_url, poll, dev_origin, api_base })
    }

    /// Replace the environment and recompute the base URL for it from the
    /// configured origin overrides.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        if environment != self.environment {
            self.environment = environment;
            self.base_url = resolve_base_url(environment, self.dev_origin.as_deref(), self.api_base.as_deref());
        }
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            base_url: resolve_base_url(Environment::Development, None, None),
            poll: PollOptions::default(),
            dev_origin: None,
            api_base: None,
        }
    }
}

/// Development goes through the same-origin proxy; production hits the API directly.
fn resolve_base_url(environment: Environment, dev_origin: Option<&str>, api_base: Option<&str>) -> String {
    let raw = match environment {
        Environment::Development => {
            let origin = dev_origin.unwrap_or(DEFAULT_DEV_ORIGIN);
            format!("{}{DEV_PROXY_PATH}", origin.trim_end_matches('/'))
        }
        Environment::Production => api_base.unwrap_or(DEFAULT_PRODUCTION_API_BASE).trim().to_owned(),
    };
    raw.trim_end_matches('/').to_owned()
}

fn env_string(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
