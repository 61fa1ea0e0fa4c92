//! License Verify - machine-bound license verification
//!
//! Checks an offline-issued license credential against:
//! 1. The local machine fingerprint (install GUID + CPU identifier)
//! 2. An HMAC-SHA256 signature keyed with the embedded shared secret
//! 3. The current time taken from network time sources, not the local clock
//!
//! Exposed to host applications through the `VerifyLicense` C entry point
//! in [`ffi`].

pub mod config;
pub mod error;
pub mod execution;
pub mod ffi;
pub mod verification;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, SharedSecret};
pub use verification::{InvalidReason, VerificationResult, Verifier};
