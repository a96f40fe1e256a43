//! actix-web integration.
//!
//! Wrap an `App` (or scope) in [`SessionMiddleware`] and take a
//! [`Session`](crate::Session) argument in handlers.

mod middleware;

pub use middleware::{SessionMiddleware, SessionRejection, SessionService, extract_session_token};
