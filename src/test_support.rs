/// Shared fakes for unit tests
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::SharedSecret;
use crate::error::{FetchError, FingerprintError};
use crate::verification::hardware::HardwareIdentitySource;
use crate::verification::hmac::{canonical_message, create_signature};
use crate::verification::network::{NetworkTimeResolver, TimeSource};
use crate::verification::{Verifier, compute_fingerprint};

pub const TEST_SECRET: &str = "test-shared-secret";

/// 2024-06-01T00:00:00Z
pub const JUNE_2024: i64 = 1_717_200_000;

/// Hardware with fixed identifiers
#[derive(Debug, Clone)]
pub struct StaticHardware {
    install_id: String,
    cpu_id: String,
}

impl StaticHardware {
    pub fn new(install_id: &str, cpu_id: &str) -> Self {
        Self {
            install_id: install_id.to_string(),
            cpu_id: cpu_id.to_string(),
        }
    }
}

impl Default for StaticHardware {
    fn default() -> Self {
        Self::new(
            "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "0000000D756E65476C65746E49656E69",
        )
    }
}

impl HardwareIdentitySource for StaticHardware {
    fn read_install_id(&self) -> Result<String, FingerprintError> {
        Ok(self.install_id.clone())
    }

    fn read_cpu_id(&self) -> Result<String, FingerprintError> {
        Ok(self.cpu_id.clone())
    }
}

/// Hardware whose install id cannot be read
pub struct FailingHardware;

impl HardwareIdentitySource for FailingHardware {
    fn read_install_id(&self) -> Result<String, FingerprintError> {
        Err(FingerprintError::Unavailable("registry key absent".to_string()))
    }

    fn read_cpu_id(&self) -> Result<String, FingerprintError> {
        Ok("0000000D756E65476C65746E49656E69".to_string())
    }
}

/// Time source with a canned answer
pub struct FixedTimeSource {
    name: String,
    timestamp: Option<i64>,
    calls: Arc<AtomicUsize>,
}

impl FixedTimeSource {
    pub fn ok(name: &str, timestamp: i64) -> Self {
        Self {
            name: name.to_string(),
            timestamp: Some(timestamp),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            timestamp: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Record every fetch in `calls`
    pub fn counting(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = calls;
        self
    }
}

impl TimeSource for FixedTimeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<i64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.timestamp
            .ok_or_else(|| FetchError::Http("connection refused".to_string()))
    }
}

/// Fingerprint of [`StaticHardware::default`]
pub fn static_fingerprint() -> String {
    compute_fingerprint(&StaticHardware::default())
        .unwrap()
        .to_string()
}

/// Credential file contents signed with [`TEST_SECRET`]
pub fn signed_credential(machine_id: &str, expire_date: &str) -> String {
    let secret = SharedSecret::new(TEST_SECRET);
    let signature = create_signature(&canonical_message(machine_id, expire_date), &secret);
    format!(
        "MachineID={}\nExpire={}\nSignature={}\n",
        machine_id, expire_date, signature
    )
}

/// Verifier on [`StaticHardware`] whose network time is `now`
pub fn verifier_at(now: i64) -> Verifier {
    Verifier::new(
        SharedSecret::new(TEST_SECRET),
        Box::new(StaticHardware::default()),
        NetworkTimeResolver::new(vec![Box::new(FixedTimeSource::ok("fixed", now))]),
    )
}

/// Verifier on [`StaticHardware`] with no reachable time source
pub fn verifier_offline() -> Verifier {
    Verifier::new(
        SharedSecret::new(TEST_SECRET),
        Box::new(StaticHardware::default()),
        NetworkTimeResolver::new(vec![
            Box::new(FixedTimeSource::failing("a")),
            Box::new(FixedTimeSource::failing("b")),
        ]),
    )
}
