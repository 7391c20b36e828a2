//! Authentication hook: turns a presented bearer token into an identity.
//!
//! The [`Authenticator`] trait is the seam between the HTTP guard and
//! whatever decides whether a token is good. [`SessionValidator`] is the
//! real implementation; tests and development setups can plug in their
//! own.
//!
//! # Validation pipeline
//!
//! ```text
//! token ─decode─→ envelope ─decrypt─→ JWT ─verify─→ claims ─store.get─→ compare
//!   │               │                  │               │                 │
//!   MalformedToken  DecryptionFailed   InvalidClaims   Store             SessionMismatch
//! ```
//!
//! Each stage runs only if the previous one succeeded: a token that fails
//! to parse is never decrypted, and a token that fails to decrypt never
//! reaches the store.

use std::fmt;
use std::future::Future;

use sealgate_protocol::{BearerToken, DotCodec, TokenCodec};
use sealgate_store::SessionStore;

use crate::issuer::bounded;
use crate::{AuthContext, RefreshPolicy, SessionError, TokenIssuer};

/// Validates a presented bearer token and returns who it belongs to.
///
/// # Trait bounds
///
/// - `Send + Sync` → the authenticator is shared by every request task.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use sealgate_protocol::{Metadata, SubjectId};
/// use sealgate_session::{AuthContext, Authenticator, SessionError};
///
/// /// Accepts any non-empty token as its own subject id.
/// /// Only for development, never in production!
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(
///         &self,
///         token: &str,
///     ) -> Result<AuthContext, SessionError> {
///         let subject = SubjectId::new(token)?;
///         Ok(AuthContext {
///             subject,
///             metadata: Metadata::new(),
///             issued_at: 0,
///             expires_at: u64::MAX,
///             rotated: None,
///         })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `token` (the part after `Bearer `).
    ///
    /// # Returns
    /// - `Ok(AuthContext)`: the token is the subject's current session
    /// - `Err(SessionError)`: anything else; callers must treat every
    ///   variant as "not authenticated"
    fn authenticate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<AuthContext, SessionError>> + Send;
}

/// The production [`Authenticator`]: checks a token against the keys and
/// the session store of a [`TokenIssuer`].
///
/// Shares everything with the issuer it was built from, so a token issued
/// through one is immediately visible to the other.
pub struct SessionValidator<S, C = DotCodec> {
    issuer: TokenIssuer<S, C>,
}

impl<S: SessionStore, C: TokenCodec> SessionValidator<S, C> {
    /// Creates a validator sharing `issuer`'s keys, store and config.
    pub fn new(issuer: TokenIssuer<S, C>) -> Self {
        Self { issuer }
    }

    /// The issuer this validator checks against (and rotates through).
    pub fn issuer(&self) -> &TokenIssuer<S, C> {
        &self.issuer
    }

    /// Applies the refresh policy to a session that just validated.
    async fn refresh(&self, context: &mut AuthContext) -> Result<(), SessionError> {
        let inner = &*self.issuer.inner;
        let subject = &context.subject;

        match inner.config.refresh {
            RefreshPolicy::Disabled => {}
            RefreshPolicy::Sliding => {
                let key = inner.config.key_for(subject);
                let extend = inner.store.expire(&key, inner.config.session_ttl);
                match bounded(inner.config.store_timeout, extend).await {
                    Ok(true) => tracing::debug!(%subject, "session extended"),
                    // Revoked or expired between the compare and now.
                    Ok(false) => {
                        tracing::warn!(%subject, "session vanished before refresh");
                    }
                    Err(e) => {
                        tracing::warn!(%subject, error = %e, "session refresh failed");
                    }
                }
            }
            RefreshPolicy::Rotate => {
                let token = self
                    .issuer
                    .issue_with_metadata(subject, context.metadata.clone())
                    .await?;
                tracing::debug!(%subject, "session rotated");
                context.rotated = Some(token);
            }
        }
        Ok(())
    }
}

impl<S: SessionStore, C: TokenCodec> Authenticator for SessionValidator<S, C> {
    async fn authenticate(&self, token: &str) -> Result<AuthContext, SessionError> {
        let inner = &*self.issuer.inner;

        let envelope = inner.codec.decode(token)?;
        let jwt = inner
            .cipher
            .decrypt_to_string(&envelope)
            .map_err(SessionError::DecryptionFailed)?;
        let claims = inner
            .signer
            .verify(&jwt)
            .map_err(SessionError::InvalidClaims)?;

        let key = inner.config.key_for(&claims.sub);
        let current =
            bounded(inner.config.store_timeout, inner.store.get(&key)).await?;
        let is_current = current
            .map(BearerToken::new)
            .is_some_and(|stored| stored.ct_eq(token));
        if !is_current {
            return Err(SessionError::SessionMismatch(claims.sub));
        }

        let mut context = AuthContext {
            subject: claims.sub,
            metadata: claims.meta,
            issued_at: claims.iat,
            expires_at: claims.exp,
            rotated: None,
        };
        self.refresh(&mut context).await?;

        tracing::debug!(subject = %context.subject, "session validated");
        Ok(context)
    }
}

impl<S, C> Clone for SessionValidator<S, C> {
    fn clone(&self) -> Self {
        Self {
            issuer: self.issuer.clone(),
        }
    }
}

impl<S, C> fmt::Debug for SessionValidator<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionValidator")
            .field("issuer", &self.issuer)
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================
