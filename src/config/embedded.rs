/// Embedded shared secret - compiled into the binary by build.rs
use std::fmt;

/// HMAC key shared with the license issuer.
///
/// Immutable once constructed. The value never appears in `Debug` output,
/// logs, or serialized configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap an explicitly injected key
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self(key.into())
    }

    /// Secret baked in at compile time from LICENSE_SHARED_SECRET.
    ///
    /// Builds without the variable get an empty key, against which no
    /// issued signature verifies.
    pub fn embedded() -> Self {
        Self::new(option_env!("LICENSE_SHARED_SECRET").unwrap_or_default())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(<{} bytes redacted>)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let secret = SharedSecret::new("hunter2");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("7 bytes"));
    }

    #[test]
    fn test_utf8_key_bytes() {
        let secret = SharedSecret::new("密码");
        assert_eq!(secret.as_bytes(), "密码".as_bytes());
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_embedded_matches_build_env() {
        let expected = option_env!("LICENSE_SHARED_SECRET").unwrap_or_default();
        assert_eq!(SharedSecret::embedded().as_bytes(), expected.as_bytes());
    }
}
