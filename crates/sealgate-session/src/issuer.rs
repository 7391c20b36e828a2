//! The token issuer: mints bearer tokens and owns the per-subject
//! session record.
//!
//! Issuing a token is a straight pipeline over the lower crates:
//!
//! ```text
//! 32 random bytes ─→ ClaimsSigner ─→ EnvelopeCipher ─→ TokenCodec ─→ store.set
//!     (nonce)           (JWT)          (envelope)       (bearer)     (record)
//! ```
//!
//! The store holds exactly one token per subject. Writing a new one is
//! what invalidates every earlier token for that subject: validation
//! compares the presented token against whatever the store holds now.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use sealgate_crypto::{ClaimsSigner, EnvelopeCipher};
use sealgate_protocol::{BearerToken, DotCodec, Metadata, SubjectId, TokenCodec};
use sealgate_store::{SessionStore, StoreError};

use crate::{SessionConfig, SessionError, SessionState};

/// Bytes of fresh entropy sealed into every token.
const NONCE_BYTES: usize = 32;

/// Everything the issuer and the validator share. Immutable after
/// construction, apart from the store, which synchronizes itself.
pub(crate) struct Components<S, C> {
    pub(crate) signer: ClaimsSigner,
    pub(crate) cipher: EnvelopeCipher,
    pub(crate) codec: C,
    pub(crate) store: S,
    pub(crate) config: SessionConfig,
}

/// Mints, revokes and inspects sessions.
///
/// Cheap to clone: every clone shares the same keys and store through an
/// `Arc`, so one issuer can be handed to every request task.
pub struct TokenIssuer<S, C = DotCodec> {
    pub(crate) inner: Arc<Components<S, C>>,
}

impl<S: SessionStore> TokenIssuer<S, DotCodec> {
    /// Creates an issuer using the standard `ciphertext.nonce.tag` layout.
    pub fn new(
        signer: ClaimsSigner,
        cipher: EnvelopeCipher,
        store: S,
        config: SessionConfig,
    ) -> Self {
        Self::with_codec(signer, cipher, DotCodec, store, config)
    }
}

impl<S: SessionStore, C: TokenCodec> TokenIssuer<S, C> {
    /// Creates an issuer with a custom token layout.
    pub fn with_codec(
        signer: ClaimsSigner,
        cipher: EnvelopeCipher,
        codec: C,
        store: S,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Components {
                signer,
                cipher,
                codec,
                store,
                config,
            }),
        }
    }

    /// Issues a token for `subject` with no metadata.
    ///
    /// See [`issue_with_metadata`](Self::issue_with_metadata).
    pub async fn issue(
        &self,
        subject: &SubjectId,
    ) -> Result<BearerToken, SessionError> {
        self.issue_with_metadata(subject, Metadata::new()).await
    }

    /// Issues a token for `subject`, sealing `metadata` into its claims,
    /// and makes it the subject's only valid token.
    ///
    /// Any token previously issued for `subject` stops validating as soon
    /// as this returns.
    ///
    /// # Errors
    /// - [`SessionError::Crypto`] if signing or encryption fails
    /// - [`SessionError::Store`] if the record cannot be written in time;
    ///   the returned token would not validate, so none is returned
    pub async fn issue_with_metadata(
        &self,
        subject: &SubjectId,
        metadata: Metadata,
    ) -> Result<BearerToken, SessionError> {
        let inner = &*self.inner;

        let nonce = fresh_nonce();
        let claims = inner
            .signer
            .sign_with(subject, &nonce, &metadata, unix_now())?;
        let envelope = inner.cipher.encrypt(claims.as_bytes())?;
        let token = inner.codec.encode(&envelope);

        let key = inner.config.key_for(subject);
        bounded(
            inner.config.store_timeout,
            inner
                .store
                .set(&key, token.as_str(), inner.config.session_ttl),
        )
        .await?;

        tracing::info!(%subject, "session issued");
        Ok(token)
    }

    /// Ends `subject`'s session (logout). Every token issued for it stops
    /// validating.
    ///
    /// Returns `true` if there was a live session to end.
    pub async fn revoke(&self, subject: &SubjectId) -> Result<bool, SessionError> {
        let inner = &*self.inner;
        let key = inner.config.key_for(subject);
        let removed =
            bounded(inner.config.store_timeout, inner.store.delete(&key)).await?;

        if removed {
            tracing::info!(%subject, "session revoked");
        } else {
            tracing::debug!(%subject, "revoke: no live session");
        }
        Ok(removed)
    }

    /// Reports whether `subject` has a live session, and for how long.
    pub async fn state(
        &self,
        subject: &SubjectId,
    ) -> Result<SessionState, SessionError> {
        let inner = &*self.inner;
        let key = inner.config.key_for(subject);
        let limit = inner.config.store_timeout;

        if bounded(limit, inner.store.get(&key)).await?.is_none() {
            return Ok(SessionState::Unissued);
        }
        let ttl = bounded(limit, inner.store.ttl(&key)).await?;
        Ok(SessionState::Active { ttl })
    }

    /// The session store this issuer writes to.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// The session configuration in effect.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The claims signer, for callers that need the claims lifetime.
    pub fn signer(&self) -> &ClaimsSigner {
        &self.inner.signer
    }
}

impl<S, C> Clone for TokenIssuer<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> fmt::Debug for TokenIssuer<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Runs a store operation, failing with [`StoreError::Timeout`] if it
/// does not finish within `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

/// Hex-encoded fresh entropy for one token.
///
/// Kept synchronous so the thread-local RNG is never held across an
/// `.await` (it is not `Send`).
fn fresh_nonce() -> String {
    let bytes: [u8; NONCE_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

/// Seconds since the Unix epoch. A clock before 1970 reads as 0, which
/// yields claims that are already expired.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================
