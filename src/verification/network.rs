/// Network time resolution
///
/// The local clock is not trusted: current time comes from public HTTPS
/// endpoints, tried one at a time in priority order. The first source that
/// answers with a usable timestamp wins; a failing source is never retried.
use std::io::Read;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Config, TimeFormat, TimeSourceConfig};
use crate::error::{FetchError, TimeError};

const USER_AGENT: &str = concat!("license-verify/", env!("CARGO_PKG_VERSION"));

/// Layout of the wall-clock strings served by commerce-platform time APIs
const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const WALL_CLOCK_LEN: usize = 19;

/// Current time as reported by one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSample {
    pub unix_timestamp: i64,
    pub source: String,
}

/// One independent network time endpoint
pub trait TimeSource {
    fn name(&self) -> &str;

    /// Seconds since the Unix epoch, UTC
    fn fetch(&self) -> Result<i64, FetchError>;
}

/// Time source backed by an HTTP GET returning JSON
pub struct HttpTimeSource {
    name: String,
    url: String,
    format: TimeFormat,
    max_body_bytes: usize,
    client: reqwest::blocking::Client,
}

impl HttpTimeSource {
    pub fn new(
        config: &TimeSourceConfig,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, FetchError> {
        // Certificate checks are off only when the source asks for it
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(config, client, max_body_bytes))
    }

    /// Use a caller-built client; `config.accept_invalid_certs` is not applied
    pub fn with_client(
        config: &TimeSourceConfig,
        client: reqwest::blocking::Client,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            name: config.name.clone(),
            url: config.url.clone(),
            format: config.format.clone(),
            max_body_bytes,
            client,
        }
    }

    fn read_body(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Read one byte past the cap so an oversized body is detectable
        let mut body = Vec::new();
        response
            .take(self.max_body_bytes as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Http(format!("failed to read body: {}", e)))?;

        if body.len() > self.max_body_bytes {
            return Err(FetchError::BodyTooLarge {
                limit: self.max_body_bytes,
            });
        }

        Ok(body)
    }
}

impl TimeSource for HttpTimeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<i64, FetchError> {
        let body = self.read_body()?;
        parse_timestamp(&body, &self.format)
    }
}

/// Extract a UTC Unix timestamp from a time source's JSON body
pub fn parse_timestamp(body: &[u8], format: &TimeFormat) -> Result<i64, FetchError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let field = format.field();
    let value = find_field(&document, field)
        .ok_or_else(|| FetchError::MissingField(field.to_string()))?;

    let timestamp = match format {
        TimeFormat::EpochMillis { .. } => integer_value(value, field)? / 1000,
        TimeFormat::EpochSeconds { .. } => integer_value(value, field)?,
        TimeFormat::WallClock {
            utc_offset_secs, ..
        } => {
            let text = value
                .as_str()
                .ok_or_else(|| FetchError::MissingField(field.to_string()))?;
            wall_clock_to_unix(text, *utc_offset_secs)?
        }
    };

    if timestamp <= 0 {
        return Err(FetchError::OutOfRange(timestamp));
    }
    Ok(timestamp)
}

/// Depth-first search for the first object member named `field`
fn find_field<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(field)
            .or_else(|| map.values().find_map(|v| find_field(v, field))),
        Value::Array(items) => items.iter().find_map(|v| find_field(v, field)),
        _ => None,
    }
}

/// Integer carried either as a JSON number or as a decimal string
fn integer_value(value: &Value, field: &str) -> Result<i64, FetchError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FetchError::Malformed(format!("field {:?} is not an integer", field)))
}

/// Convert `YYYY-MM-DD HH:MM:SS` at `utc_offset_secs` east of UTC to epoch seconds
///
/// The digits are read as if they were UTC, then the zone offset is
/// subtracted. Anything after the first 19 characters is ignored.
fn wall_clock_to_unix(text: &str, utc_offset_secs: i32) -> Result<i64, FetchError> {
    let text = text.trim();
    let head = text.get(..WALL_CLOCK_LEN).unwrap_or(text);

    let local = NaiveDateTime::parse_from_str(head, WALL_CLOCK_FORMAT)
        .map_err(|e| FetchError::Malformed(format!("bad wall-clock time {:?}: {}", head, e)))?;

    Ok(local.and_utc().timestamp() - i64::from(utc_offset_secs))
}

/// Ordered fallback across time sources
pub struct NetworkTimeResolver {
    sources: Vec<Box<dyn TimeSource + Send + Sync>>,
}

impl NetworkTimeResolver {
    pub fn new(sources: Vec<Box<dyn TimeSource + Send + Sync>>) -> Self {
        Self { sources }
    }

    /// Build HTTP sources for every configured endpoint, in config order
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let sources = config
            .time_sources
            .iter()
            .map(|source| {
                HttpTimeSource::new(source, timeout, config.max_body_bytes)
                    .map(|s| Box::new(s) as Box<dyn TimeSource + Send + Sync>)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(sources))
    }

    /// Query sources in order and return the first timestamp obtained
    pub fn resolve_time(&self) -> Result<TimeSample, TimeError> {
        for source in &self.sources {
            match source.fetch() {
                Ok(unix_timestamp) => {
                    debug!(source = source.name(), unix_timestamp, "network time resolved");
                    return Ok(TimeSample {
                        unix_timestamp,
                        source: source.name().to_string(),
                    });
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "time source failed, trying next");
                }
            }
        }

        Err(TimeError::AllSourcesFailed {
            attempted: self.sources.len(),
        })
    }
}
