//! Stateless, encrypted cookie sessions.
//!
//! A [`Session`] is a small JSON object that travels with the client instead of
//! living on the server. On every request the session cookie is opened with
//! AES-256-GCM, checked for freshness, and handed to the handler. When the
//! handler returns, the (possibly mutated) session is sealed again and written
//! back as a `Set-Cookie` header.
//!
//! Any cookie that cannot be opened (expired, tampered, wrong key, garbage) is
//! silently replaced by a fresh copy of the configured default session.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use axum::{Router, middleware, routing::get};
//! use sealed_session::api::axum::session_middleware;
//! use sealed_session::{CookieConfig, SecretKey, Session, SessionManager};
//!
//! async fn counter(session: Session) -> String {
//!     let visits = session.get::<u64>("visits").unwrap_or(0) + 1;
//!     session.insert_value("visits", visits.into());
//!     format!("visits: {visits}")
//! }
//!
//! let manager = SessionManager::new(SecretKey::generate(), CookieConfig::default())?;
//! let app: Router = Router::new()
//!     .route("/", get(counter))
//!     .layer(middleware::from_fn_with_state(Arc::new(manager), session_middleware));
//! ```

pub mod api;
pub mod crypto;
pub mod manager;
pub mod secret;
pub mod session;

pub use manager::SessionManager;
pub use secret::SecretKey;
pub use session::{
    CookieConfig, JsonFormat, SameSite, Session, SessionCodec, SessionData, SessionFormat,
};

/// Configuration mistakes. These are only ever raised while building a
/// [`SessionManager`], never while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid same_site value {0:?}, expected one of \"strict\", \"lax\", \"none\"")]
    InvalidSameSite(String),
    #[error("secret key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("secret key is not valid url-safe base64")]
    InvalidKeyEncoding,
    #[error("invalid cookie name {0:?}")]
    InvalidCookieName(String),
    #[error("invalid cookie {attribute} {value:?}")]
    InvalidCookieAttribute {
        attribute: &'static str,
        value: String,
    },
}

/// Fatal session errors. Decode problems never show up here, they are
/// absorbed into the default session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("failed to encode session: {0}")]
    Encode(String),
    #[error("failed to encrypt session")]
    Encrypt,
}

/// A session token could not be turned back into session data.
///
/// Every cause (bad encoding, wrong key, tampering, expiry, unreadable
/// payload) produces the same value, so callers cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid session token")]
pub struct DecodeFailure;
