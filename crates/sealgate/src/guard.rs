//! The HTTP-facing guard: pulls the bearer token out of a request and
//! turns the session layer's verdict into either an [`AuthContext`] or a
//! uniform [`Rejection`].
//!
//! The guard does no routing of its own. Call it from whatever request
//! filter or middleware your server uses:
//!
//! ```rust,ignore
//! match guard.admit(request).await {
//!     Ok(authenticated) => handle(authenticated).await,
//!     Err(rejection) => rejection.into_response(),
//! }
//! ```

use http::header::AUTHORIZATION;
use http::{HeaderMap, Request};
use sealgate_session::{AuthContext, Authenticator, SessionError};

use crate::Rejection;

/// Validates the `Authorization: Bearer <token>` header of incoming
/// requests.
///
/// Cheap to clone when the authenticator is (the standard
/// `SessionValidator` is).
#[derive(Debug, Clone)]
pub struct AuthGuard<A> {
    authenticator: A,
}

/// A request that passed the guard, together with who sent it.
#[derive(Debug)]
pub struct Authenticated<B> {
    pub request: Request<B>,
    pub context: AuthContext,
}

impl<B> Authenticated<B> {
    /// Splits into the request and its identity.
    pub fn into_parts(self) -> (Request<B>, AuthContext) {
        (self.request, self.context)
    }
}

impl<A: Authenticator> AuthGuard<A> {
    pub fn new(authenticator: A) -> Self {
        Self { authenticator }
    }

    /// The authenticator this guard delegates to.
    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Authenticates a request by its headers.
    ///
    /// Every failure is logged with its internal reason and returned as
    /// the same opaque [`Rejection`].
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<AuthContext, Rejection> {
        self.check(headers).await.map_err(|err| {
            match err.subject() {
                Some(subject) => tracing::warn!(
                    reason = err.kind(),
                    %subject,
                    "request rejected"
                ),
                None => tracing::warn!(reason = err.kind(), "request rejected"),
            }
            Rejection::from(&err)
        })
    }

    /// Authenticates `request` and hands it back with its identity.
    pub async fn admit<B>(
        &self,
        request: Request<B>,
    ) -> Result<Authenticated<B>, Rejection> {
        let context = self.authenticate(request.headers()).await?;
        Ok(Authenticated { request, context })
    }

    /// Like [`authenticate`](Self::authenticate), but returns the
    /// internal error unlogged. For diagnostics and tests; never send
    /// its output to a client.
    pub async fn check(&self, headers: &HeaderMap) -> Result<AuthContext, SessionError> {
        let token = bearer_token(headers)?;
        self.authenticator.authenticate(token).await
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Anything else (no header,
/// a non-ASCII value, another scheme, an empty or space-containing
/// token) counts as no credential at all.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(SessionError::MissingCredentials)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(SessionError::MissingCredentials)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(SessionError::MissingCredentials);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_standard_header_returns_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.012")).unwrap(), "abc.def.012");
    }

    #[test]
    fn test_bearer_token_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("bearer tok")).unwrap(), "tok");
        assert_eq!(bearer_token(&headers("BEARER tok")).unwrap(), "tok");
    }

    #[test]
    fn test_bearer_token_absent_header_is_missing() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(SessionError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_other_scheme_is_missing() {
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(SessionError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_bare_token_is_missing() {
        // No scheme to split off.
        assert!(matches!(
            bearer_token(&headers("abc.def.012")),
            Err(SessionError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_empty_or_extra_parts_is_missing() {
        for value in ["Bearer ", "Bearer a b", "Bearer  a"] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(SessionError::MissingCredentials)),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_bearer_token_non_ascii_value_is_missing() {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap());

        assert!(matches!(bearer_token(&map), Err(SessionError::MissingCredentials)));
    }
}
