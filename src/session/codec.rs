use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::SessionData;
use super::format::{JsonFormat, SessionFormat};
use crate::crypto::TokenCipher;
use crate::secret::SecretKey;
use crate::{DecodeFailure, SessionError};

/// Converts session data to sealed tokens and back.
#[derive(Clone)]
pub struct SessionCodec {
    cipher: TokenCipher,
    format: Arc<dyn SessionFormat>,
}

impl SessionCodec {
    /// Creates a codec that stores sessions as JSON.
    #[must_use]
    pub fn new(key: &SecretKey) -> Self {
        Self::with_format(key, Arc::new(JsonFormat))
    }

    #[must_use]
    pub fn with_format(key: &SecretKey, format: Arc<dyn SessionFormat>) -> Self {
        Self {
            cipher: TokenCipher::new(key),
            format,
        }
    }

    pub(crate) fn set_format(&mut self, format: Arc<dyn SessionFormat>) {
        self.format = format;
    }

    /// Seals session data into a token stamped with the current time.
    ///
    /// # Errors
    ///
    /// Fails only if the data cannot be serialized, which is a bug in the
    /// caller rather than something to recover from.
    pub fn encode(&self, data: &SessionData) -> Result<String, SessionError> {
        self.encode_at(data, Utc::now())
    }

    /// Like [`encode`](Self::encode), with an explicit clock.
    pub fn encode_at(
        &self,
        data: &SessionData,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let bytes = self.format.encode(data)?;
        self.cipher.seal(&bytes, now.timestamp())
    }

    /// Opens a token issued less than `max_age` seconds ago.
    ///
    /// `None` accepts tokens of any age. Every reason a token is rejected
    /// yields the same `DecodeFailure`.
    pub fn decode(
        &self,
        token: &str,
        max_age: Option<u64>,
    ) -> Result<SessionData, DecodeFailure> {
        self.decode_at(token, max_age, Utc::now())
    }

    /// Like [`decode`](Self::decode), with an explicit clock.
    pub fn decode_at(
        &self,
        token: &str,
        max_age: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<SessionData, DecodeFailure> {
        let bytes = self.cipher.open(token, max_age, now.timestamp())?;
        self.format.decode(&bytes)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}
