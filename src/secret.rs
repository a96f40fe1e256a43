//! Secret key material.
//!
//! [`SecretKey`] holds the raw AES-256 key used to seal session tokens. It
//! never prints its contents, so it is safe to keep inside configuration
//! structs that derive `Debug`.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::ConfigError;

/// Length of a session key in bytes.
pub const KEY_LEN: usize = 32;

/// A 256-bit key for sealing and opening session tokens.
///
/// # Example
///
/// ```rust
/// use sealed_session::SecretKey;
///
/// let key = SecretKey::generate();
///
/// // Debug output shows [REDACTED]
/// assert_eq!(format!("{:?}", key), "SecretKey([REDACTED])");
///
/// // Keys survive a trip through their text form
/// let restored = SecretKey::from_base64(&key.to_base64()).unwrap();
/// assert_eq!(key, restored);
/// ```
#[derive(Clone)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Builds a key from exactly [`KEY_LEN`] raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidKeyLength` for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| ConfigError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(key))
    }

    /// Parses a key from url-safe base64, padded or not.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidKeyEncoding` if the text is not base64 and
    /// `ConfigError::InvalidKeyLength` if it decodes to the wrong length.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim().trim_end_matches('='))
            .map_err(|_| ConfigError::InvalidKeyEncoding)?;
        Self::from_bytes(&bytes)
    }

    /// Generates a fresh random key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Encodes the key as unpadded url-safe base64, suitable for env vars.
    #[must_use]
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Exposes the raw key bytes.
    #[must_use]
    pub fn expose_secret(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = ConfigError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<[u8; KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretKey {}
