/// License verification - sequences the individual checks into one verdict
///
/// Order is fixed and fail-fast:
/// 1. parse the credential
/// 2. compare the local machine fingerprint
/// 3. recompute and compare the signature
/// 4. resolve network time (fail-closed when no source answers)
/// 5. compare against 23:59:59 UTC on the expiry date
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::fingerprint::compute_fingerprint;
use super::hardware::{HardwareIdentitySource, PlatformIdentity};
use super::hmac::verify_signature;
use super::network::NetworkTimeResolver;
use crate::config::{Config, SharedSecret};
use crate::error::{CredentialError, FetchError};

const EXPIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a credential was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Credential missing, empty, unreadable, or lacking a required field
    MalformedCredential,
    /// Local hardware identifiers could not be read
    FingerprintUnavailable,
    /// Credential was issued for a different machine
    MachineMismatch,
    /// Signature does not match the recomputed MAC
    BadSignature,
    /// No network time source answered
    TimeUnavailable,
    /// Verification did not run to completion
    Aborted,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReason::MalformedCredential => "malformed credential",
            InvalidReason::FingerprintUnavailable => "machine fingerprint unavailable",
            InvalidReason::MachineMismatch => "machine mismatch",
            InvalidReason::BadSignature => "bad signature",
            InvalidReason::TimeUnavailable => "network time unavailable",
            InvalidReason::Aborted => "verification aborted",
        };
        f.write_str(text)
    }
}

/// Outcome of one verification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Valid { expire_date: String },
    Invalid { reason: InvalidReason },
    Expired { expire_date: String },
}

impl VerificationResult {
    /// External status code: 0 valid, 1 invalid, 2 expired
    pub fn status_code(&self) -> i32 {
        match self {
            VerificationResult::Valid { .. } => 0,
            VerificationResult::Invalid { .. } => 1,
            VerificationResult::Expired { .. } => 2,
        }
    }

    /// Expiry date echoed back to the caller, verbatim from the credential
    pub fn expire_date(&self) -> Option<&str> {
        match self {
            VerificationResult::Valid { expire_date }
            | VerificationResult::Expired { expire_date } => Some(expire_date),
            VerificationResult::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid { .. })
    }

    fn invalid(reason: InvalidReason) -> Self {
        VerificationResult::Invalid { reason }
    }
}

/// License verifier holding the shared secret and its collaborators
///
/// Holds no mutable state; one instance can serve concurrent calls.
pub struct Verifier {
    secret: SharedSecret,
    hardware: Box<dyn HardwareIdentitySource + Send + Sync>,
    resolver: NetworkTimeResolver,
}

impl Verifier {
    pub fn new(
        secret: SharedSecret,
        hardware: Box<dyn HardwareIdentitySource + Send + Sync>,
        resolver: NetworkTimeResolver,
    ) -> Self {
        Self {
            secret,
            hardware,
            resolver,
        }
    }

    /// Verifier for this machine using the configured time sources
    pub fn from_config(config: &Config, secret: SharedSecret) -> Result<Self, FetchError> {
        Ok(Self::new(
            secret,
            Box::new(PlatformIdentity),
            NetworkTimeResolver::from_config(config)?,
        ))
    }

    /// Verify a credential file; a missing file is a malformed credential
    pub fn verify_file(&self, path: &Path) -> VerificationResult {
        match Credential::read(path) {
            Ok(credential) => self.verify_credential(&credential),
            Err(e) => reject_malformed(e),
        }
    }

    /// Verify raw credential bytes
    pub fn verify_license(&self, raw: &[u8]) -> VerificationResult {
        match Credential::parse(raw) {
            Ok(credential) => self.verify_credential(&credential),
            Err(e) => reject_malformed(e),
        }
    }

    fn verify_credential(&self, credential: &Credential) -> VerificationResult {
        let fingerprint = match compute_fingerprint(self.hardware.as_ref()) {
            Ok(fp) => fp,
            Err(e) => {
                warn!(error = %e, "cannot compute machine fingerprint");
                return VerificationResult::invalid(InvalidReason::FingerprintUnavailable);
            }
        };

        if fingerprint.as_str() != credential.machine_id {
            warn!(
                expected = %credential.machine_id,
                actual = %fingerprint,
                "license issued for a different machine"
            );
            return VerificationResult::invalid(InvalidReason::MachineMismatch);
        }

        if !verify_signature(
            &credential.machine_id,
            &credential.expire_date,
            &credential.signature,
            &self.secret,
        ) {
            warn!(expire_date = %credential.expire_date, "license signature mismatch");
            return VerificationResult::invalid(InvalidReason::BadSignature);
        }

        let now = match self.resolver.resolve_time() {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "cannot determine network time");
                return VerificationResult::invalid(InvalidReason::TimeUnavailable);
            }
        };

        let Some(expires_at) = expiry_instant(&credential.expire_date) else {
            warn!(expire_date = %credential.expire_date, "expiry is not a calendar date");
            return VerificationResult::invalid(InvalidReason::MalformedCredential);
        };

        debug!(
            now = now.unix_timestamp,
            source = %now.source,
            expires_at,
            "comparing network time with expiry"
        );

        let expire_date = credential.expire_date.clone();
        if now.unix_timestamp > expires_at {
            info!(expire_date = %expire_date, "license expired");
            VerificationResult::Expired { expire_date }
        } else {
            info!(expire_date = %expire_date, "license valid");
            VerificationResult::Valid { expire_date }
        }
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

fn reject_malformed(error: CredentialError) -> VerificationResult {
    warn!(error = %error, "cannot read license credential");
    VerificationResult::invalid(InvalidReason::MalformedCredential)
}

/// Last second of the expiry date, UTC, as a Unix timestamp
fn expiry_instant(expire_date: &str) -> Option<i64> {
    NaiveDate::parse_from_str(expire_date, EXPIRE_DATE_FORMAT)
        .ok()?
        .and_hms_opt(23, 59, 59)
        .map(|end_of_day| end_of_day.and_utc().timestamp())
}
