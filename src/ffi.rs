/// C ABI entry point for host applications
///
/// ```c
/// int VerifyLicense(char* out_expire, int out_len);
/// ```
///
/// Reads `license.dat` from the current directory and returns
/// 0 (valid), 1 (invalid or error) or 2 (expired). On 0 and 2 the expiry
/// date is copied into `out_expire`, truncated to fit and always
/// NUL-terminated. On 1 the buffer is left untouched.
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use libc::{c_char, c_int};
use tracing::error;

use crate::config::{Config, SharedSecret};
use crate::verification::{InvalidReason, VerificationResult, Verifier};

pub const STATUS_VALID: c_int = 0;
pub const STATUS_INVALID: c_int = 1;
pub const STATUS_EXPIRED: c_int = 2;

/// Verify `license.dat` in the working directory with the embedded secret
///
/// # Safety
/// `out_expire` must be null or point to at least `out_len` writable bytes.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn VerifyLicense(out_expire: *mut c_char, out_len: c_int) -> c_int {
    let result = guarded(|| {
        let config = Config::default();
        match Verifier::from_config(&config, SharedSecret::embedded()) {
            Ok(verifier) => verifier.verify_file(&config.license_path),
            Err(e) => {
                error!(error = %e, "cannot build time sources");
                VerificationResult::Invalid {
                    reason: InvalidReason::TimeUnavailable,
                }
            }
        }
    });

    if out_expire.is_null() || out_len <= 0 {
        return result.status_code();
    }

    // SAFETY: non-null and `out_len` bytes long per the caller contract
    let buf = unsafe { std::slice::from_raw_parts_mut(out_expire.cast::<u8>(), out_len as usize) };
    echo_expiry(&result, buf)
}

/// Run `verify`, reporting a panic as `Invalid(Aborted)` instead of
/// unwinding into the host. Requires `panic = "unwind"` in the build profile.
fn guarded(verify: impl FnOnce() -> VerificationResult) -> VerificationResult {
    panic::catch_unwind(AssertUnwindSafe(verify)).unwrap_or_else(|_| {
        error!("license verification panicked");
        VerificationResult::Invalid {
            reason: InvalidReason::Aborted,
        }
    })
}

/// Run a verifier against a license file and echo the expiry into `buf`
pub fn verify_into(verifier: &Verifier, license_path: &Path, buf: &mut [u8]) -> c_int {
    let result = verifier.verify_file(license_path);
    echo_expiry(&result, buf)
}

/// Fill `buf` for valid/expired verdicts and return the status code
fn echo_expiry(result: &VerificationResult, buf: &mut [u8]) -> c_int {
    if let Some(expire_date) = result.expire_date() {
        write_c_string(buf, expire_date);
    }
    result.status_code()
}

/// Copy `text` into `buf` as a NUL-terminated string, truncating to fit
pub fn write_c_string(buf: &mut [u8], text: &str) {
    let Some(capacity) = buf.len().checked_sub(1) else {
        return;
    };
    let len = text.len().min(capacity);
    buf[..len].copy_from_slice(&text.as_bytes()[..len]);
    buf[len] = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn license_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn c_str(buf: &[u8]) -> &str {
        let end = buf.iter().position(|&b| b == 0).unwrap();
        std::str::from_utf8(&buf[..end]).unwrap()
    }

    #[test]
    fn test_valid_echoes_expiry() {
        let file = license_file(&signed_credential(&static_fingerprint(), "2099-01-01"));
        let mut buf = [0xAAu8; 32];

        let status = verify_into(&verifier_at(JUNE_2024), file.path(), &mut buf);
        assert_eq!(status, STATUS_VALID);
        assert_eq!(c_str(&buf), "2099-01-01");
    }

    #[test]
    fn test_expired_echoes_expiry() {
        let file = license_file(&signed_credential(&static_fingerprint(), "2000-01-01"));
        let mut buf = [0xAAu8; 32];

        let status = verify_into(&verifier_at(JUNE_2024), file.path(), &mut buf);
        assert_eq!(status, STATUS_EXPIRED);
        assert_eq!(c_str(&buf), "2000-01-01");
    }

    #[test]
    fn test_invalid_leaves_buffer_untouched() {
        let contents = format!(
            "MachineID={}\nExpire=2099-01-01\nSignature=deadbeef\n",
            static_fingerprint()
        );
        let file = license_file(&contents);
        let mut buf = [0xAAu8; 32];

        let status = verify_into(&verifier_at(JUNE_2024), file.path(), &mut buf);
        assert_eq!(status, STATUS_INVALID);
        assert!(buf.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_time_unavailable_is_invalid() {
        let file = license_file(&signed_credential(&static_fingerprint(), "2099-01-01"));
        let mut buf = [0u8; 32];

        let status = verify_into(&verifier_offline(), file.path(), &mut buf);
        assert_eq!(status, STATUS_INVALID);
    }

    #[test]
    fn test_write_c_string_truncates() {
        let mut buf = [0xAAu8; 5];
        write_c_string(&mut buf, "2099-01-01");
        assert_eq!(&buf, b"2099\0");

        let mut buf = [0xAAu8; 1];
        write_c_string(&mut buf, "2099-01-01");
        assert_eq!(&buf, b"\0");

        let mut empty: [u8; 0] = [];
        write_c_string(&mut empty, "2099-01-01");
    }

    #[test]
    fn test_status_codes_match_verdicts() {
        let valid = VerificationResult::Valid { expire_date: "2099-01-01".to_string() };
        let expired = VerificationResult::Expired { expire_date: "2000-01-01".to_string() };
        let invalid = VerificationResult::Invalid { reason: InvalidReason::Aborted };

        assert_eq!(valid.status_code(), STATUS_VALID);
        assert_eq!(expired.status_code(), STATUS_EXPIRED);
        assert_eq!(invalid.status_code(), STATUS_INVALID);
    }

    #[test]
    fn test_panic_becomes_aborted() {
        let result = guarded(|| panic!("hardware driver fault"));
        assert_eq!(
            result,
            VerificationResult::Invalid {
                reason: InvalidReason::Aborted
            }
        );
        assert_eq!(result.status_code(), STATUS_INVALID);
    }

    #[test]
    fn test_release_profile_keeps_unwinding() {
        // Under panic = "abort" the guard above never runs in a shipped cdylib
        let manifest = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"))
            .unwrap();
        let release = manifest
            .split("[profile.release]")
            .nth(1)
            .expect("release profile present");
        let release = release.split("\n[").next().unwrap();

        let panic_setting = release
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("panic"))
            .expect("release profile sets panic strategy");
        assert_eq!(panic_setting.replace(' ', ""), "panic=\"unwind\"");
    }

    #[test]
    fn test_null_buffer_is_tolerated() {
        // No license.dat in the crate root, so this fails before any network call
        let status = unsafe { VerifyLicense(std::ptr::null_mut(), 0) };
        assert_eq!(status, STATUS_INVALID);
    }
}
