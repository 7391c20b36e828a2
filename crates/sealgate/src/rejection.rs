//! The single, uniform response for every authentication failure.

use http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use http::{HeaderValue, Response, StatusCode};
use sealgate_session::SessionError;
use serde::Serialize;

const MISSING_CREDENTIALS: &str = "missing credentials";
const INVALID_SESSION: &str = "invalid or expired session";

/// An authentication failure, as the client sees it.
///
/// Deliberately carries almost nothing: the client learns whether it sent
/// a credential at all, never why a credential it sent was refused.
/// Expired, tampered, revoked and store-failure cases are all the same
/// `"invalid or expired session"`. The reason is logged server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Rejection {
    message: &'static str,
}

/// JSON body of a rejection:
/// `{"status":"error","data":null,"message":...,"code":401}`.
#[derive(Debug, Serialize)]
pub struct RejectionBody {
    pub status: &'static str,
    pub data: Option<()>,
    pub message: &'static str,
    pub code: u16,
}

impl Rejection {
    /// No bearer credential was presented.
    pub const fn missing_credentials() -> Self {
        Self {
            message: MISSING_CREDENTIALS,
        }
    }

    /// A credential was presented and refused.
    pub const fn invalid_session() -> Self {
        Self {
            message: INVALID_SESSION,
        }
    }

    /// Always `401 Unauthorized`.
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// The client-facing message.
    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn body(&self) -> RejectionBody {
        RejectionBody {
            status: "error",
            data: None,
            message: self.message,
            code: self.status().as_u16(),
        }
    }

    /// Renders the rejection as an HTTP response with a JSON body.
    pub fn into_response(self) -> Response<String> {
        // A struct of static strings and an integer always serializes.
        let body = serde_json::to_string(&self.body()).unwrap_or_default();

        let mut response = Response::new(body);
        *response.status_mut() = self.status();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

impl From<&SessionError> for Rejection {
    fn from(err: &SessionError) -> Self {
        if err.is_missing_credentials() {
            Self::missing_credentials()
        } else {
            Self::invalid_session()
        }
    }
}

impl From<SessionError> for Rejection {
    fn from(err: SessionError) -> Self {
        Self::from(&err)
    }
}

impl From<Rejection> for Response<String> {
    fn from(rejection: Rejection) -> Self {
        rejection.into_response()
    }
}
