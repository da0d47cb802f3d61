//! Configuration loading and validation for `sealctl`.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if any required variable is missing or
//! invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Minimum length of a system secret, in characters.
pub const MIN_SECRET_LEN: usize = 16;

/// Validated `sealctl` configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Comma-separated system secrets. The first one is current and used for
    /// encryption; the rest are rotated and only used for decryption.
    /// **Required.**
    pub system_secrets: String,

    /// How long (milliseconds) key retrieval may take before a call fails.
    #[serde(default = "default_key_fetch_timeout_ms")]
    pub key_fetch_timeout_ms: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_fetch_timeout_ms() -> u64 {
    5000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Configured secrets in order, current first, blanks removed.
    pub fn secrets(&self) -> Vec<&str> {
        self.system_secrets
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Key retrieval timeout.
    pub fn key_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.key_fetch_timeout_ms)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        let secrets = self.secrets();
        if secrets.is_empty() {
            anyhow::bail!("SYSTEM_SECRETS is required and must contain at least one secret");
        }
        for (position, secret) in secrets.iter().enumerate() {
            let len = secret.chars().count();
            if len < MIN_SECRET_LEN {
                anyhow::bail!(
                    "SYSTEM_SECRETS entry {position} must be at least {MIN_SECRET_LEN} characters, got {len}"
                );
            }
        }
        if self.key_fetch_timeout_ms == 0 {
            anyhow::bail!("KEY_FETCH_TIMEOUT_MS must be > 0");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("system_secrets", &format_args!("[REDACTED; {}]", self.secrets().len()))
            .field("key_fetch_timeout_ms", &self.key_fetch_timeout_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(system_secrets: &str) -> Config {
        Config {
            system_secrets: system_secrets.into(),
            key_fetch_timeout_ms: default_key_fetch_timeout_ms(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_key_fetch_timeout_ms(), 5000);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn secrets_split_in_order() {
        let c = cfg(" current-secret-0001 , older-secret-00002,,oldest-secret-0003 ");
        assert_eq!(
            c.secrets(),
            vec!["current-secret-0001", "older-secret-00002", "oldest-secret-0003"]
        );
    }

    #[test]
    fn validate_rejects_empty_secrets() {
        assert!(cfg("").validate().is_err());
        assert!(cfg(" , ").validate().is_err());
    }

    #[test]
    fn validate_rejects_short_secret() {
        let err = cfg("long-enough-secret-1,short").validate().unwrap_err();
        assert!(err.to_string().contains("entry 1"), "{err}");
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut c = cfg("long-enough-secret-1");
        c.key_fetch_timeout_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(cfg("long-enough-secret-1,long-enough-secret-0").validate().is_ok());
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", cfg("long-enough-secret-1,long-enough-secret-0"));
        assert!(!debug.contains("long-enough"));
        assert!(debug.contains("[REDACTED; 2]"));
    }
}
