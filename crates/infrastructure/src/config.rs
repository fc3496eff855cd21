//! Client configuration.
//!
//! Defaults can be overridden through environment variables:
//!
//! | variable | meaning |
//! |---|---|
//! | `CALLCHECK_USER_AGENT` | `User-Agent` sent by the default transport |
//! | `CALLCHECK_TIMEOUT_MS` | request timeout, `0` disables it |
//! | `CALLCHECK_MAX_REDIRECTS` | redirect limit |
//! | `CALLCHECK_SHUTDOWN_GRACE_MS` | how long a local server may drain |

use std::time::Duration;

use thiserror::Error;

/// Environment variable overriding the user agent.
pub const USER_AGENT_ENV: &str = "CALLCHECK_USER_AGENT";
/// Environment variable overriding the request timeout.
pub const TIMEOUT_ENV: &str = "CALLCHECK_TIMEOUT_MS";
/// Environment variable overriding the redirect limit.
pub const MAX_REDIRECTS_ENV: &str = "CALLCHECK_MAX_REDIRECTS";
/// Environment variable overriding the server shutdown grace period.
pub const SHUTDOWN_GRACE_ENV: &str = "CALLCHECK_SHUTDOWN_GRACE_MS";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for {name}: {message}")]
pub struct ConfigError {
    /// Variable name
    pub name: &'static str,
    /// Offending value
    pub value: String,
    /// Parser message
    pub message: String,
}

/// Settings of the default transport and of hosted handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `User-Agent` header value
    pub user_agent: String,
    /// Per-request timeout, `None` for no timeout
    pub timeout: Option<Duration>,
    /// Maximum number of redirects to follow
    pub max_redirects: usize,
    /// Time a local server gets to finish in-flight connections
    pub shutdown_grace: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("callcheck/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Some(Duration::from_secs(30)),
            max_redirects: 10,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(user_agent) = lookup(USER_AGENT_ENV) {
            config.user_agent = user_agent;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, TIMEOUT_ENV)? {
            config.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(max) = parse_var::<usize>(&lookup, MAX_REDIRECTS_ENV)? {
            config.max_redirects = max;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, SHUTDOWN_GRACE_ENV)? {
            config.shutdown_grace = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Returns the timeout in milliseconds, used in error messages.
    #[must_use]
    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError {
            name,
            value: value.clone(),
            message: e.to_string(),
        })
}
