use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use super::error::SessionRejection;
use crate::{Session, SessionManager};

/// Returns the raw session cookie value from the request headers.
pub fn extract_session_token(headers: &HeaderMap, manager: &SessionManager) -> Option<String> {
    let values = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok());

    manager.find_token(values).map(ToOwned::to_owned)
}

/// Loads the session before the rest of the stack runs and writes it back
/// as a `Set-Cookie` header afterwards.
///
/// Install with [`axum::middleware::from_fn_with_state`]:
///
/// ```rust,ignore
/// use std::sync::Arc;
///
/// use axum::{Router, middleware, routing::get};
/// use sealed_session::api::axum::session_middleware;
///
/// let manager = Arc::new(manager);
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn_with_state(manager, session_middleware));
/// ```
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "session_middleware", skip_all)
)]
pub async fn session_middleware(
    State(manager): State<Arc<SessionManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionRejection> {
    let token = extract_session_token(request.headers(), &manager);

    manager
        .intercept(
            token.as_deref(),
            |session| async move {
                request.extensions_mut().insert(session);
                Ok(next.run(request).await)
            },
            |response: &mut Response, set_cookie| {
                let value = HeaderValue::try_from(set_cookie)
                    .map_err(|_| SessionRejection::InvalidHeader)?;
                response.headers_mut().append(SET_COOKIE, value);
                Ok(())
            },
        )
        .await
}

/// Extracts the current request's [`Session`].
///
/// Rejects with `500` when [`session_middleware`] is not installed, since
/// that is a wiring bug rather than a client error.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(SessionRejection::MissingMiddleware)
    }
}
