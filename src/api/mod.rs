//! Adapters that plug [`SessionManager`](crate::SessionManager) into web
//! frameworks.

mod types;

pub use types::*;

#[cfg(feature = "actix")]
pub mod actix;

#[cfg(feature = "axum")]
pub mod axum;
