use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::http::header::{COOKIE, HeaderValue, SET_COOKIE};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use futures::future::{LocalBoxFuture, Ready, ok, ready};

use crate::api::ErrorResponse;
use crate::{Session, SessionError, SessionManager};

/// Session middleware for actix-web.
///
/// Loads the session before the wrapped service runs and appends the
/// re-sealed session cookie to its response.
///
/// # Example
///
/// ```rust,ignore
/// use sealed_session::api::actix::SessionMiddleware;
///
/// App::new()
///     .wrap(SessionMiddleware::new(manager))
///     .route("/", web::get().to(handler))
/// ```
#[derive(Clone)]
pub struct SessionMiddleware {
    manager: Arc<SessionManager>,
}

impl SessionMiddleware {
    #[must_use]
    pub fn new(manager: SessionManager) -> Self {
        Self::from_shared(Arc::new(manager))
    }

    #[must_use]
    pub fn from_shared(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = SessionService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionService {
            service: Rc::new(service),
            manager: Arc::clone(&self.manager),
        })
    }
}

/// The actual middleware service.
pub struct SessionService<S> {
    service: Rc<S>,
    manager: Arc<SessionManager>,
}

impl<S, B> Service<ServiceRequest> for SessionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let manager = Arc::clone(&self.manager);
        let token = extract_session_token(req.request(), &manager);

        Box::pin(async move {
            manager
                .intercept(
                    token.as_deref(),
                    |session| {
                        req.extensions_mut().insert(session);
                        service.call(req)
                    },
                    |res: &mut ServiceResponse<B>, set_cookie| {
                        let value = HeaderValue::try_from(set_cookie)
                            .map_err(|_| SessionRejection::InvalidHeader)?;
                        res.headers_mut().append(SET_COOKIE, value);
                        Ok(())
                    },
                )
                .await
        })
    }
}

/// Returns the raw session cookie value from the request headers.
pub fn extract_session_token(req: &HttpRequest, manager: &SessionManager) -> Option<String> {
    let values = req
        .headers()
        .get_all(COOKIE)
        .filter_map(|value| value.to_str().ok());

    manager.find_token(values).map(ToOwned::to_owned)
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();
        ready(session.ok_or_else(|| SessionRejection::MissingMiddleware.into()))
    }
}

/// Why the session layer could not serve a request.
#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("session middleware is not installed on this route")]
    MissingMiddleware,
    #[error("session cookie is not a valid header value")]
    InvalidHeader,
}

impl ResponseError for SessionRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!(target: "sealed_session", "msg=\"session rejection\" error=\"{self}\"");

        let code = match self {
            SessionRejection::MissingMiddleware => "SESSION_MIDDLEWARE_MISSING",
            SessionRejection::InvalidHeader => "SESSION_INVALID_HEADER",
        };

        HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Internal server error".to_owned(),
            code: code.to_owned(),
        })
    }
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!(target: "sealed_session", "msg=\"session error\" error=\"{self}\"");
        HttpResponse::InternalServerError().json(ErrorResponse::from(self))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;
    use crate::{CookieConfig, SecretKey};

    fn manager() -> SessionManager {
        SessionManager::new(SecretKey::generate(), CookieConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_session_token() {
        let req = TestRequest::default()
            .append_header((COOKIE, "theme=dark"))
            .append_header((COOKIE, "lang=en; session=tok123"))
            .to_http_request();

        assert_eq!(
            extract_session_token(&req, &manager()),
            Some("tok123".to_owned())
        );
    }

    #[test]
    fn test_extract_session_token_absent() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(extract_session_token(&req, &manager()), None);
    }

    #[test]
    fn test_session_error_is_internal_error() {
        let err = SessionError::Encode("boom".to_owned());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejection_is_internal_error() {
        let err = SessionRejection::MissingMiddleware;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_rt::test]
    async fn test_extractor_without_middleware_fails() {
        let req = TestRequest::default().to_http_request();
        let result = Session::extract(&req).await;
        assert!(result.is_err());
    }
}
