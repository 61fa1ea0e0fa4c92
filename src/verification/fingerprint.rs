/// Machine fingerprinting for license verification
use std::fmt;

use sha2::{Digest, Sha256};

use super::hardware::HardwareIdentitySource;
use crate::error::FingerprintError;

/// Lower-case SHA-256 hex digest identifying one machine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate machine fingerprint
///
/// Concatenates the install identifier and the CPU identifier with no
/// separator and hashes the result.
///
/// # Returns
/// SHA256 hex digest, or `Unavailable` if either identifier cannot be read
pub fn compute_fingerprint(
    source: &dyn HardwareIdentitySource,
) -> Result<Fingerprint, FingerprintError> {
    let install_id = source.read_install_id()?;
    let cpu_id = source.read_cpu_id()?;

    if install_id.is_empty() || cpu_id.is_empty() {
        return Err(FingerprintError::Unavailable(
            "hardware identifier is empty".to_string(),
        ));
    }

    let mut hasher = Sha256::new();
    hasher.update(install_id.as_bytes());
    hasher.update(cpu_id.as_bytes());
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}
