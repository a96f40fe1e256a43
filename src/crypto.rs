//! Token sealing.
//!
//! Implements timestamped AES-256-GCM tokens. A token is laid out as
//!
//! ```text
//! version (1) | issued_at (8, big-endian unix seconds) | nonce (12) | ciphertext + tag (16+)
//! ```
//!
//! and rendered as unpadded url-safe base64 so it can sit in a cookie value
//! without quoting. The version byte and timestamp are authenticated as
//! associated data, so neither can be edited without breaking the tag.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::secret::SecretKey;
use crate::{DecodeFailure, SessionError};

pub const TOKEN_VERSION: u8 = 0x01;

const HEADER_LEN: usize = 1 + 8;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Tokens issued further than this into the future are rejected.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Seals and opens session tokens under a single key.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    #[must_use]
    pub fn new(key: &SecretKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.expose_secret());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Seals `plaintext` into a token stamped with `issued_at` (unix seconds).
    ///
    /// A fresh random nonce is drawn on every call, so sealing the same
    /// plaintext twice yields two different tokens.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Encrypt` if the AEAD refuses the input, which
    /// only happens for plaintexts far beyond any cookie size.
    pub fn seal(&self, plaintext: &[u8], issued_at: i64) -> Result<String, SessionError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let header = header(issued_at);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: &header,
                },
            )
            .map_err(|_| SessionError::Encrypt)?;

        let mut combined = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&header);
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(&combined))
    }

    /// Opens a token and checks its freshness against `now` (unix seconds).
    ///
    /// With `max_age = Some(secs)` a token is only fresh while
    /// `now - issued_at < secs`, so a max age of zero rejects everything.
    /// `None` disables the age check but still rejects tokens from the future.
    pub fn open(
        &self,
        token: &str,
        max_age: Option<u64>,
        now: i64,
    ) -> Result<Vec<u8>, DecodeFailure> {
        let combined = URL_SAFE_NO_PAD.decode(token).map_err(|_| DecodeFailure)?;

        if combined.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(DecodeFailure);
        }

        let (header, rest) = combined.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        if header.first() != Some(&TOKEN_VERSION) {
            return Err(DecodeFailure);
        }

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| DecodeFailure)?;

        let timestamp: [u8; 8] = header
            .get(1..HEADER_LEN)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(DecodeFailure)?;
        let issued_at = i64::from_be_bytes(timestamp);
        if !is_fresh(issued_at, max_age, now) {
            return Err(DecodeFailure);
        }

        Ok(plaintext)
    }
}

fn header(issued_at: i64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    let (version, timestamp) = header.split_at_mut(1);
    version.copy_from_slice(&[TOKEN_VERSION]);
    timestamp.copy_from_slice(&issued_at.to_be_bytes());
    header
}

fn is_fresh(issued_at: i64, max_age: Option<u64>, now: i64) -> bool {
    if issued_at > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
        return false;
    }

    match max_age {
        None => true,
        Some(max_age) => {
            let age = u64::try_from(now.saturating_sub(issued_at)).unwrap_or(0);
            age < max_age
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn cipher() -> TokenCipher {
        TokenCipher::new(&SecretKey::from([9u8; 32]))
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = cipher();
        let token = cipher.seal(b"Hello, World!", NOW).unwrap();

        let opened = cipher.open(&token, Some(60), NOW).unwrap();
        assert_eq!(opened, b"Hello, World!");
    }

    #[test]
    fn test_unique_ciphertexts() {
        let cipher = cipher();

        let first = cipher.seal(b"data", NOW).unwrap();
        let second = cipher.seal(b"data", NOW).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_token_is_cookie_safe() {
        let token = cipher().seal(b"{\"a\":1}", NOW).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = cipher();
        let token = cipher.seal(b"", NOW).unwrap();
        assert_eq!(cipher.open(&token, None, NOW).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_every_bit_flip_is_rejected() {
        let cipher = cipher();
        let token = cipher.seal(b"{\"value\":120}", NOW).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();

        for index in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[index] ^= 1 << bit;
                let tampered = URL_SAFE_NO_PAD.encode(&tampered);
                assert_eq!(
                    cipher.open(&tampered, None, NOW),
                    Err(DecodeFailure),
                    "flip of bit {bit} in byte {index} was accepted"
                );
            }
        }
    }

    #[test]
    fn test_wrong_key() {
        let token = cipher().seal(b"data", NOW).unwrap();
        let other = TokenCipher::new(&SecretKey::from([10u8; 32]));

        assert_eq!(other.open(&token, None, NOW), Err(DecodeFailure));
    }

    #[test]
    fn test_expiry_boundaries() {
        let cipher = cipher();
        let max_age = 3600;
        let token = cipher.seal(b"data", NOW).unwrap();

        assert!(cipher.open(&token, Some(max_age), NOW + 3599).is_ok());
        assert_eq!(
            cipher.open(&token, Some(max_age), NOW + 3601),
            Err(DecodeFailure)
        );
    }

    #[test]
    fn test_zero_max_age_rejects_everything() {
        let cipher = cipher();
        let token = cipher.seal(b"data", NOW).unwrap();

        assert_eq!(cipher.open(&token, Some(0), NOW), Err(DecodeFailure));
    }

    #[test]
    fn test_no_max_age_never_expires() {
        let cipher = cipher();
        let token = cipher.seal(b"data", NOW).unwrap();

        assert!(cipher.open(&token, None, NOW + 10 * 365 * 24 * 3600).is_ok());
    }

    #[test]
    fn test_future_tokens_rejected() {
        let cipher = cipher();
        let token = cipher.seal(b"data", NOW + MAX_CLOCK_SKEW_SECS + 1).unwrap();

        assert_eq!(cipher.open(&token, None, NOW), Err(DecodeFailure));

        let within_skew = cipher.seal(b"data", NOW + MAX_CLOCK_SKEW_SECS).unwrap();
        assert!(cipher.open(&within_skew, Some(60), NOW).is_ok());
    }

    #[test]
    fn test_malformed_tokens() {
        let cipher = cipher();

        assert_eq!(cipher.open("", None, NOW), Err(DecodeFailure));
        assert_eq!(cipher.open("invalid data", None, NOW), Err(DecodeFailure));
        assert_eq!(cipher.open("invalid_base64_%%%", None, NOW), Err(DecodeFailure));
        assert_eq!(cipher.open("c2hvcnQ", None, NOW), Err(DecodeFailure));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let cipher = cipher();
        let token = cipher.seal(b"data", NOW).unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
        bytes[0] = 0x80;

        assert_eq!(
            cipher.open(&URL_SAFE_NO_PAD.encode(&bytes), None, NOW),
            Err(DecodeFailure)
        );
    }
}
