//! axum integration.
//!
//! [`session_middleware`] runs as an `axum::middleware::from_fn_with_state`
//! layer; handlers take a [`Session`](crate::Session) argument to read and
//! change the session.

mod error;
mod middleware;

pub use error::SessionRejection;
pub use middleware::{extract_session_token, session_middleware};
