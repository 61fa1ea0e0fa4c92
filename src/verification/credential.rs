/// License credential parsing
///
/// The credential is a flat text blob written by the offline issuer:
///
/// ```text
/// MachineID=<hex fingerprint>
/// Expire=<YYYY-MM-DD>
/// Signature=<hex HMAC>
/// ```
///
/// Lines may end in `\n` or `\r\n`, and a leading UTF-8 byte-order mark
/// is skipped. Keys may appear in any order; unknown
/// keys are ignored. If a key repeats, its first occurrence wins.
use std::fs;
use std::path::Path;

use crate::error::CredentialError;

const MACHINE_ID_KEY: &str = "MachineID";
const EXPIRE_KEY: &str = "Expire";
const SIGNATURE_KEY: &str = "Signature";

/// Parsed license record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Expected machine fingerprint
    pub machine_id: String,
    /// Expiry calendar date, kept verbatim as issued
    pub expire_date: String,
    /// Hex HMAC over `machine_id|expire_date`
    pub signature: String,
}

impl Credential {
    /// Parse a credential blob
    pub fn parse(raw: &[u8]) -> Result<Self, CredentialError> {
        if raw.is_empty() {
            return Err(CredentialError::Empty);
        }

        let text = std::str::from_utf8(raw).map_err(|_| CredentialError::Encoding)?;
        // Editors on Windows may prepend a byte-order mark
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        Ok(Self {
            machine_id: required(text, MACHINE_ID_KEY)?,
            expire_date: required(text, EXPIRE_KEY)?,
            signature: required(text, SIGNATURE_KEY)?,
        })
    }

    /// Read and parse a credential file
    pub fn read(path: &Path) -> Result<Self, CredentialError> {
        let raw = fs::read(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }
}

fn required(text: &str, key: &'static str) -> Result<String, CredentialError> {
    lookup(text, key)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(CredentialError::MissingField(key))
}

/// First value recorded for `key`, with one trailing `\r` removed
fn lookup<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.split('\n').find_map(|line| {
        let (k, v) = line.split_once('=')?;
        (k == key).then(|| v.strip_suffix('\r').unwrap_or(v))
    })
}
