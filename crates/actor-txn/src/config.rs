//! # Coordinator Configuration
//!
//! Defaults suit tests and the demo binary. Every knob can be overridden from the environment:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TXN_CALL_TIMEOUT_MS` | `call_timeout` | 5000 |
//! | `TXN_COMMIT_MAX_ATTEMPTS` | `retry.max_attempts` | 8 |
//! | `TXN_COMMIT_BACKOFF_MS` | `retry.initial_backoff` | 50 |
//! | `TXN_COMMIT_MAX_BACKOFF_MS` | `retry.max_backoff` | 5000 |
//! | `TXN_MAILBOX_SIZE` | `mailbox_size` | 32 |
//! | `TXN_STATE_DIR` | `state_dir` | unset (in-memory state) |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// An environment variable is set but does not parse.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// The values parse but do not make sense together.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the commit phase is retried after a failed round.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first commit round. `0` disables retrying.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt` (1-based): doubles from `initial_backoff`, capped at
    /// `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .checked_mul(1u32 << exponent)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

/// Configuration shared by every coordinator instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Deadline for each prepare or commit call to one participant.
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
    /// Mailbox capacity of every actor instance.
    pub mailbox_size: usize,
    /// Directory of the file-backed state store; `None` keeps state in memory.
    pub state_dir: Option<PathBuf>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
            mailbox_size: 32,
            state_dir: None,
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CoordinatorConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "TXN_CALL_TIMEOUT_MS")? {
            config.call_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse_var(&lookup, "TXN_COMMIT_MAX_ATTEMPTS")? {
            config.retry.max_attempts = attempts;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "TXN_COMMIT_BACKOFF_MS")? {
            config.retry.initial_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "TXN_COMMIT_MAX_BACKOFF_MS")? {
            config.retry.max_backoff = Duration::from_millis(ms);
        }
        if let Some(size) = parse_var(&lookup, "TXN_MAILBOX_SIZE")? {
            config.mailbox_size = size;
        }
        if let Some(dir) = lookup("TXN_STATE_DIR").filter(|dir| !dir.is_empty()) {
            config.state_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.call_timeout.is_zero() {
            return Err(ConfigError::Invalid("call timeout cannot be 0".to_string()));
        }

        if self.mailbox_size == 0 {
            return Err(ConfigError::Invalid("mailbox size cannot be 0".to_string()));
        }

        if self.retry.initial_backoff > self.retry.max_backoff {
            return Err(ConfigError::Invalid(
                "initial commit backoff cannot exceed max backoff".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}
