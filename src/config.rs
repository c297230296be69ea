//! Startup configuration
//!
//! Read once from the environment and immutable afterwards.

use crate::duration::{deadline, parse_duration};
use crate::store::{IDENTITIES_FILE, WARNINGS_FILE};
use chrono::{TimeDelta, Utc};
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const TOKEN_VAR: &str = "BOT_TOKEN";
/// Accepted when `BOT_TOKEN` is unset, matching teloxide's own convention
pub const FALLBACK_TOKEN_VAR: &str = "TELOXIDE_TOKEN";
pub const DATA_DIR_VAR: &str = "WARDEN_DATA_DIR";
pub const LOG_DIR_VAR: &str = "WARDEN_LOG_DIR";
pub const MAX_WARNINGS_VAR: &str = "WARDEN_MAX_WARNINGS";
pub const MUTE_DURATION_VAR: &str = "WARDEN_MUTE_DURATION";
pub const ESCALATION_MUTE_VAR: &str = "WARDEN_ESCALATION_MUTE";
pub const RULES_FILE_VAR: &str = "WARDEN_RULES_FILE";

/// Errors in the startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Process-wide discipline policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Warnings that trigger an automatic mute
    pub max_warnings: u32,
    /// Mute length when `/mute` gets no usable duration
    pub default_mute: TimeDelta,
    /// Mute length applied on escalation
    pub escalation_mute: TimeDelta,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_warnings: 3,
            default_mute: TimeDelta::days(1),
            escalation_mute: TimeDelta::days(1),
        }
    }
}

/// Bot configuration
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    /// Directory holding the warning ledger and identity directory files
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Replacement for the built-in group rules text
    pub rules_file: Option<PathBuf>,
    pub policy: PolicyConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .field("log_dir", &self.log_dir)
            .field("rules_file", &self.rules_file)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Config {
    /// Load the configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the token is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration from any key lookup
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the token is missing or a value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get(TOKEN_VAR)
            .or_else(|| get(FALLBACK_TOKEN_VAR))
            .ok_or(ConfigError::Missing(TOKEN_VAR))?;

        let defaults = PolicyConfig::default();
        let max_warnings = match get(MAX_WARNINGS_VAR) {
            Some(value) => match value.parse::<u32>() {
                Ok(max) if max >= 1 => max,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: MAX_WARNINGS_VAR,
                        value,
                        reason: "expected a whole number of at least 1",
                    });
                }
            },
            None => defaults.max_warnings,
        };

        let policy = PolicyConfig {
            max_warnings,
            default_mute: duration_var(&get, MUTE_DURATION_VAR, defaults.default_mute)?,
            escalation_mute: duration_var(&get, ESCALATION_MUTE_VAR, defaults.escalation_mute)?,
        };

        Ok(Self {
            bot_token,
            data_dir: get(DATA_DIR_VAR).map_or_else(|| PathBuf::from("data"), PathBuf::from),
            log_dir: get(LOG_DIR_VAR).map_or_else(|| PathBuf::from("logs"), PathBuf::from),
            rules_file: get(RULES_FILE_VAR).map(PathBuf::from),
            policy,
        })
    }

    #[must_use]
    pub fn warnings_path(&self) -> PathBuf {
        self.data_dir.join(WARNINGS_FILE)
    }

    #[must_use]
    pub fn identities_path(&self) -> PathBuf {
        self.data_dir.join(IDENTITIES_FILE)
    }
}

fn duration_var(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: TimeDelta,
) -> Result<TimeDelta, ConfigError> {
    let Some(value) = get(key) else {
        return Ok(default);
    };
    let Some(duration) = parse_duration(&value) else {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a duration such as 30m, 2h or 1d",
        });
    };
    if deadline(Utc::now(), duration).is_none() {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: "duration reaches past the last representable date",
        });
    }
    Ok(duration)
}
