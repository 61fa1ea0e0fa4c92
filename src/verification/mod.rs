/// Verification module - Fingerprinting, credential parsing, signatures and network time
pub mod hardware;
pub mod fingerprint;
pub mod credential;
pub mod hmac;
pub mod network;
pub mod license;

pub use hardware::{HardwareIdentitySource, PlatformIdentity};
pub use fingerprint::{Fingerprint, compute_fingerprint};
pub use credential::Credential;
pub use hmac::{canonical_message, create_signature, verify_signature};
pub use network::{HttpTimeSource, NetworkTimeResolver, TimeSample, TimeSource};
pub use license::{InvalidReason, VerificationResult, Verifier};
