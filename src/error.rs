/// Error types for each verification layer
use std::path::PathBuf;

use thiserror::Error;

/// Hardware identity could not be read.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("hardware identifier unavailable: {0}")]
    Unavailable(String),
}

/// Credential blob could not be turned into a [`Credential`](crate::verification::Credential).
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credential {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential is empty")]
    Empty,

    #[error("credential is not valid UTF-8")]
    Encoding,

    #[error("credential field {0} is missing or empty")]
    MissingField(&'static str),
}

/// A single time source failed to produce a timestamp.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response has no usable field {0:?}")]
    MissingField(String),

    #[error("timestamp {0} is out of range")]
    OutOfRange(i64),
}

/// Every configured time source failed.
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("all {attempted} time sources failed")]
    AllSourcesFailed { attempted: usize },
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
