/// HMAC-SHA256 signature generation and validation
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::SharedSecret;

type HmacSha256 = Hmac<Sha256>;

/// Message the issuer signs: `machine_id|expire_date`
pub fn canonical_message(machine_id: &str, expire_date: &str) -> String {
    format!("{}|{}", machine_id, expire_date)
}

/// Create HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - Data to sign (the canonical message)
/// * `secret` - Shared secret key
///
/// # Returns
/// Lower-case hex HMAC signature
pub fn create_signature(data: &str, secret: &SharedSecret) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a credential signature
///
/// Exact, case-sensitive comparison of the stored hex string against the
/// recomputed one.
///
/// # Returns
/// true if signature is valid
pub fn verify_signature(
    machine_id: &str,
    expire_date: &str,
    signature: &str,
    secret: &SharedSecret,
) -> bool {
    let expected = create_signature(&canonical_message(machine_id, expire_date), secret);

    // Use constant-time comparison to prevent timing attacks
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINGERPRINT: &str = "6ec30ab01ad538200cb18795aa8fe750a12173dd6760dd9ef3e6a268fed966d8";

    #[test]
    fn test_rfc4231_vector() {
        let secret = SharedSecret::new("Jefe");
        assert_eq!(
            create_signature("what do ya want for nothing?", &secret),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_matches_issuer_signature() {
        // Produced by the issuing tool with its default key
        let secret = SharedSecret::new("密码");
        assert!(verify_signature(
            FINGERPRINT,
            "2099-01-01",
            "b1a644288306c0ee55aa3b69c1d511a55228d08e7a733a9db3645eafddff21e9",
            &secret
        ));
    }

    #[test]
    fn test_canonical_message() {
        assert_eq!(canonical_message("abc", "2099-01-01"), "abc|2099-01-01");
    }

    #[test]
    fn test_verify_signature() {
        let secret = SharedSecret::new("test_secret");
        let signature = create_signature(&canonical_message("mid", "2099-01-01"), &secret);
        assert!(verify_signature("mid", "2099-01-01", &signature, &secret));

        // Wrong secret should fail
        let wrong = SharedSecret::new("wrong_secret");
        assert!(!verify_signature("mid", "2099-01-01", &signature, &wrong));

        // Wrong data should fail
        assert!(!verify_signature("mid", "2099-01-02", &signature, &secret));
        assert!(!verify_signature("mix", "2099-01-01", &signature, &secret));

        // Tampered signature should fail
        let mut tampered = signature.clone();
        tampered.push('0');
        assert!(!verify_signature("mid", "2099-01-01", &tampered, &secret));
        assert!(!verify_signature("mid", "2099-01-01", &signature[..63], &secret));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let secret = SharedSecret::new("test_secret");
        let signature = create_signature(&canonical_message("mid", "2099-01-01"), &secret);
        assert!(!verify_signature("mid", "2099-01-01", &signature.to_uppercase(), &secret));
    }
}
