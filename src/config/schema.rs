/// Configuration schema for the license verifier
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Path of the credential file
    #[serde(default = "default_license_path")]
    pub license_path: PathBuf,

    /// Per-request timeout for time sources (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Largest response body accepted from a time source
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Network time sources, tried in order until one answers
    #[serde(default = "default_time_sources")]
    pub time_sources: Vec<TimeSourceConfig>,
}

/// One network time endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeSourceConfig {
    /// Name used in logs and in the resolved sample
    pub name: String,

    /// Full HTTPS URL, fetched with a plain GET
    pub url: String,

    /// How the response body encodes the current time
    pub format: TimeFormat,

    /// Skip certificate validation (unknown CA, hostname mismatch, expired cert).
    ///
    /// Keeps time available behind broken TLS setups at the cost of letting a
    /// man-in-the-middle supply any time it likes.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
}

/// Encoding of the timestamp inside a time source's JSON body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeFormat {
    /// Milliseconds since the epoch; truncated to seconds
    EpochMillis { field: String },

    /// `YYYY-MM-DD HH:MM:SS` wall-clock time at a fixed UTC offset
    WallClock { field: String, utc_offset_secs: i32 },

    /// Seconds since the epoch
    EpochSeconds { field: String },
}

impl TimeFormat {
    /// Name of the JSON field holding the time
    pub fn field(&self) -> &str {
        match self {
            TimeFormat::EpochMillis { field }
            | TimeFormat::WallClock { field, .. }
            | TimeFormat::EpochSeconds { field } => field,
        }
    }
}

/// UTC+8, the zone the commerce-platform wall clock reports in
pub const CHINA_STANDARD_OFFSET_SECS: i32 = 8 * 3600;

fn default_true() -> bool {
    true
}

fn default_license_path() -> PathBuf {
    PathBuf::from("license.dat")
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The three public time sources, in priority order
pub fn default_time_sources() -> Vec<TimeSourceConfig> {
    vec![
        TimeSourceConfig {
            name: "taobao".to_string(),
            url: "https://api.m.taobao.com/rest/api3.do?api=mtop.common.getTimestamp".to_string(),
            format: TimeFormat::EpochMillis {
                field: "t".to_string(),
            },
            accept_invalid_certs: true,
        },
        TimeSourceConfig {
            name: "suning".to_string(),
            url: "https://quan.suning.com/getSysTime.do".to_string(),
            format: TimeFormat::WallClock {
                field: "sysTime2".to_string(),
                utc_offset_secs: CHINA_STANDARD_OFFSET_SECS,
            },
            accept_invalid_certs: true,
        },
        TimeSourceConfig {
            name: "worldtimeapi".to_string(),
            url: "https://worldtimeapi.org/api/timezone/Asia/Shanghai".to_string(),
            format: TimeFormat::EpochSeconds {
                field: "unixtime".to_string(),
            },
            accept_invalid_certs: true,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            license_path: default_license_path(),
            request_timeout_ms: default_request_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
            log_level: default_log_level(),
            time_sources: default_time_sources(),
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.license_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("license_path cannot be empty".to_string()));
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".to_string()));
        }

        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("max_body_bytes must be positive".to_string()));
        }

        if self.time_sources.is_empty() {
            return Err(ConfigError::Invalid("at least one time source is required".to_string()));
        }

        for source in &self.time_sources {
            if source.name.is_empty() {
                return Err(ConfigError::Invalid("time source name cannot be empty".to_string()));
            }

            if !source.url.starts_with("http://") && !source.url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "time source {} url must start with http:// or https://",
                    source.name
                )));
            }

            if source.format.field().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "time source {} field cannot be empty",
                    source.name
                )));
            }
        }

        Ok(())
    }
}
