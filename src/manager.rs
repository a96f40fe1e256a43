//! The framework-independent half of the session middleware.
//!
//! [`SessionManager`] knows how to turn a request's cookies into a
//! [`Session`] and how to turn that session back into a `Set-Cookie` header.
//! The adapters in [`crate::api`] only move headers and extensions around.

use std::future::Future;
use std::sync::Arc;

use crate::session::{
    CookieConfig, SameSite, Session, SessionCodec, SessionData, SessionFormat, parse_cookie,
    parse_cookie_headers, serialize_set_cookie,
};
use crate::{ConfigError, SecretKey, SessionError};

const LOG_TARGET: &str = "sealed_session";

/// Immutable session settings shared by every request.
///
/// # Example
///
/// ```rust
/// use sealed_session::{CookieConfig, SecretKey, SessionManager};
/// use serde_json::json;
///
/// let default = json!({"value": 0}).as_object().cloned().unwrap_or_default();
/// let manager = SessionManager::new(SecretKey::generate(), CookieConfig::default())
///     .unwrap()
///     .with_default(default);
///
/// let session = manager.load(None);
/// assert_eq!(session.get::<i64>("value"), Some(0));
///
/// session.insert_value("value", json!(120));
/// let set_cookie = manager.store(&session).unwrap();
/// assert!(set_cookie.starts_with("session="));
/// ```
#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: SessionCodec,
    cookie: CookieConfig,
    default_value: SessionData,
}

impl SessionManager {
    /// Creates a manager with an empty default session and JSON payloads.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the cookie configuration is unusable. Bad
    /// settings surface here, at startup, rather than on the first request.
    pub fn new(key: SecretKey, cookie: CookieConfig) -> Result<Self, ConfigError> {
        cookie.validate()?;

        if cookie.same_site == SameSite::None && !cookie.secure {
            log::warn!(
                target: LOG_TARGET,
                "msg=\"SameSite=None without Secure, browsers may drop the cookie\" cookie=\"{}\"",
                cookie.name
            );
        }

        Ok(Self {
            codec: SessionCodec::new(&key),
            cookie,
            default_value: SessionData::new(),
        })
    }

    /// Sets the session handed out when a request has no usable cookie.
    #[must_use]
    pub fn with_default(mut self, default_value: SessionData) -> Self {
        self.default_value = default_value;
        self
    }

    /// Replaces the JSON payload format.
    #[must_use]
    pub fn with_format(mut self, format: impl SessionFormat + 'static) -> Self {
        self.codec.set_format(Arc::new(format));
        self
    }

    #[must_use]
    pub fn cookie_config(&self) -> &CookieConfig {
        &self.cookie
    }

    #[must_use]
    pub fn default_value(&self) -> &SessionData {
        &self.default_value
    }

    #[must_use]
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Finds the session cookie in one or more `Cookie` request headers.
    pub fn find_token<'a, I>(&self, cookie_headers: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        parse_cookie_headers(cookie_headers, &self.cookie.name)
    }

    /// Builds the session for a request from its `Cookie` header.
    #[must_use]
    pub fn load(&self, cookie_header: Option<&str>) -> Session {
        let token = cookie_header.and_then(|header| parse_cookie(header, &self.cookie.name));
        self.load_token(token)
    }

    /// Builds the session for a request from the raw session cookie value.
    ///
    /// A missing or unusable token yields a fresh copy of the default
    /// session. The reason a token was rejected is not reported.
    #[must_use]
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_load", skip_all)
    )]
    pub fn load_token(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            log::debug!(
                target: LOG_TARGET,
                "msg=\"no session cookie, using default\" cookie=\"{}\"",
                self.cookie.name
            );
            return Session::new(self.default_value.clone());
        };

        match self.codec.decode(token, Some(self.cookie.max_age)) {
            Ok(data) => Session::new(data),
            Err(_) => {
                log::debug!(
                    target: LOG_TARGET,
                    "msg=\"session cookie rejected, using default\" cookie=\"{}\"",
                    self.cookie.name
                );
                Session::new(self.default_value.clone())
            }
        }
    }

    /// Seals the session and renders the `Set-Cookie` header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized. Callers should
    /// fail the request instead of sending a partial session.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_store", skip_all, err)
    )]
    pub fn store(&self, session: &Session) -> Result<String, SessionError> {
        let token = self.codec.encode(&session.snapshot()).inspect_err(|e| {
            log::error!(
                target: LOG_TARGET,
                "msg=\"failed to encode session\" error=\"{e}\""
            );
        })?;

        Ok(serialize_set_cookie(&self.cookie.name, &token, &self.cookie))
    }

    /// Runs `next` with the request's session, then attaches the session
    /// cookie to whatever `next` produced.
    ///
    /// If `next` fails its error is returned untouched and nothing is
    /// attached. If the session cannot be stored or attached the response is
    /// dropped and the error returned instead.
    pub async fn intercept<F, Fut, R, E>(
        &self,
        token: Option<&str>,
        next: F,
        attach: impl FnOnce(&mut R, String) -> Result<(), E>,
    ) -> Result<R, E>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<SessionError>,
    {
        let session = self.load_token(token);

        let mut response = next(session.clone()).await?;

        let set_cookie = self.store(&session)?;
        attach(&mut response, set_cookie)?;

        Ok(response)
    }
}
