//! Session payload formats.
//!
//! A [`SessionFormat`] turns session data into the bytes that get encrypted,
//! and back. JSON is the default; anything that produces bytes will do.

use std::fmt;

use super::SessionData;
use crate::{DecodeFailure, SessionError};

pub trait SessionFormat: Send + Sync {
    /// Serializes session data.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Encode` when the data cannot be represented.
    fn encode(&self, data: &SessionData) -> Result<Vec<u8>, SessionError>;

    /// Deserializes session data. Any problem is a `DecodeFailure`.
    fn decode(&self, bytes: &[u8]) -> Result<SessionData, DecodeFailure>;
}

/// UTF-8 JSON object text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl SessionFormat for JsonFormat {
    fn encode(&self, data: &SessionData) -> Result<Vec<u8>, SessionError> {
        serde_json::to_vec(data).map_err(|e| SessionError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<SessionData, DecodeFailure> {
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeFailure)?;
        serde_json::from_str(text).map_err(|_| DecodeFailure)
    }
}

/// A format built from a pair of plain functions.
///
/// # Example
///
/// ```rust
/// use sealed_session::session::FnFormat;
/// use sealed_session::{DecodeFailure, SessionError};
///
/// // JSON with a one-byte schema tag in front
/// let format = FnFormat::new(
///     |data| {
///         let mut bytes = vec![b'1'];
///         bytes.extend(serde_json::to_vec(data).map_err(|e| SessionError::Encode(e.to_string()))?);
///         Ok(bytes)
///     },
///     |bytes| {
///         let body = bytes.strip_prefix(b"1").ok_or(DecodeFailure)?;
///         serde_json::from_slice(body).map_err(|_| DecodeFailure)
///     },
/// );
/// # let _ = format;
/// ```
pub struct FnFormat<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnFormat<E, D>
where
    E: Fn(&SessionData) -> Result<Vec<u8>, SessionError> + Send + Sync,
    D: Fn(&[u8]) -> Result<SessionData, DecodeFailure> + Send + Sync,
{
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<E, D> SessionFormat for FnFormat<E, D>
where
    E: Fn(&SessionData) -> Result<Vec<u8>, SessionError> + Send + Sync,
    D: Fn(&[u8]) -> Result<SessionData, DecodeFailure> + Send + Sync,
{
    fn encode(&self, data: &SessionData) -> Result<Vec<u8>, SessionError> {
        (self.encode)(data)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SessionData, DecodeFailure> {
        (self.decode)(bytes)
    }
}

impl<E, D> fmt::Debug for FnFormat<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnFormat")
    }
}
