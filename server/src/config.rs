//! Server configuration module.
//!
//! Parses configuration from environment variables for the TidyList server.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `PORT` | No | 8080 | HTTP server port |
//! | `TIDYLIST_SESSION_TTL_SECS` | No | 86400 | Idle session lifetime in seconds |
//! | `TIDYLIST_MAX_SESSIONS` | No | 10000 | Maximum concurrent sessions |
//! | `TIDYLIST_SECURE_COOKIES` | No | false | Add `Secure` to the session cookie |

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default HTTP server port.
const DEFAULT_PORT: u16 = 8080;

/// Default idle session TTL in seconds (24 hours).
const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

/// Default maximum number of concurrent sessions.
const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable has invalid format.
    #[error("invalid format for {var}: {message}")]
    InvalidFormat { var: String, message: String },

    /// A numeric variable failed to parse.
    #[error("invalid number for {var}: {source}")]
    InvalidNumber {
        var: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,

    /// Idle session lifetime; refreshed on every session write.
    pub session_ttl: Duration,

    /// Maximum number of concurrent sessions.
    pub max_sessions: usize,

    /// When true, the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid format, a
    /// numeric value fails to parse, or validation fails (zero TTL or
    /// zero capacity).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidylist_server::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load config");
    /// println!("Server will listen on port {}", config.port);
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_u16_env("PORT", DEFAULT_PORT)?;
        let ttl_secs = parse_u64_env("TIDYLIST_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let max_sessions = parse_usize_env("TIDYLIST_MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?;
        let secure_cookies = parse_bool_env("TIDYLIST_SECURE_COOKIES");

        let config = Self {
            port,
            session_ttl: Duration::from_secs(ttl_secs),
            max_sessions,
            secure_cookies,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl.is_zero() {
            return Err(ConfigError::ValidationError(
                "TIDYLIST_SESSION_TTL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.max_sessions == 0 {
            return Err(ConfigError::ValidationError(
                "TIDYLIST_MAX_SESSIONS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a boolean environment variable.
///
/// Returns `true` if the variable is set to "true" (case-insensitive),
/// `false` otherwise.
fn parse_bool_env(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_u16_env(name: &str, default: u16) -> Result<u16, ConfigError> {
    parse_num_env(name, default)
}

fn parse_u64_env(name: &str, default: u64) -> Result<u64, ConfigError> {
    parse_num_env(name, default)
}

fn parse_usize_env(name: &str, default: usize) -> Result<usize, ConfigError> {
    parse_num_env(name, default)
}

/// Parse a numeric environment variable, falling back to `default` when
/// the variable is unset.
fn parse_num_env<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|source| ConfigError::InvalidNumber {
            var: name.to_string(),
            source,
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidFormat {
            var: name.to_string(),
            message: "contains invalid unicode".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::set_var(key, value);
        }

        fn remove(&mut self, key: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::remove_var(key);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_nothing_is_set() {
        let mut guard = EnvGuard::new();
        guard.remove("PORT");
        guard.remove("TIDYLIST_SESSION_TTL_SECS");
        guard.remove("TIDYLIST_MAX_SESSIONS");
        guard.remove("TIDYLIST_SECURE_COOKIES");

        let config = Config::from_env().expect("should parse config");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(
            config.session_ttl,
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS)
        );
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert!(!config.secure_cookies);
    }

    #[test]
    #[serial]
    fn custom_values_are_parsed() {
        let mut guard = EnvGuard::new();
        guard.set("PORT", "9090");
        guard.set("TIDYLIST_SESSION_TTL_SECS", "600");
        guard.set("TIDYLIST_MAX_SESSIONS", "50");
        guard.set("TIDYLIST_SECURE_COOKIES", "TRUE");

        let config = Config::from_env().expect("should parse config");
        assert_eq!(config.port, 9090);
        assert_eq!(config.session_ttl, Duration::from_secs(600));
        assert_eq!(config.max_sessions, 50);
        assert!(config.secure_cookies);
    }

    #[test]
    #[serial]
    fn invalid_port_is_rejected() {
        let mut guard = EnvGuard::new();
        guard.set("PORT", "not-a-number");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidNumber { ref var, .. } if var == "PORT"
        ));
    }

    #[test]
    #[serial]
    fn out_of_range_port_is_rejected() {
        let mut guard = EnvGuard::new();
        guard.set("PORT", "99999");

        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn zero_ttl_fails_validation() {
        let mut guard = EnvGuard::new();
        guard.remove("PORT");
        guard.remove("TIDYLIST_MAX_SESSIONS");
        guard.set("TIDYLIST_SESSION_TTL_SECS", "0");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    #[serial]
    fn zero_max_sessions_fails_validation() {
        let mut guard = EnvGuard::new();
        guard.remove("PORT");
        guard.remove("TIDYLIST_SESSION_TTL_SECS");
        guard.set("TIDYLIST_MAX_SESSIONS", "0");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    #[serial]
    fn bool_env_parses_case_insensitively() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_BOOL", "true");
        assert!(parse_bool_env("TEST_BOOL"));

        guard.set("TEST_BOOL", "True");
        assert!(parse_bool_env("TEST_BOOL"));

        guard.set("TEST_BOOL", "false");
        assert!(!parse_bool_env("TEST_BOOL"));

        guard.set("TEST_BOOL", "anything-else");
        assert!(!parse_bool_env("TEST_BOOL"));

        guard.remove("TEST_BOOL");
        assert!(!parse_bool_env("TEST_BOOL"));
    }
}
