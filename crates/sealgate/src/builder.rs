//! `Sealgate` builder: turns a [`SealgateConfig`] into a ready issuer and
//! guard.
//!
//! This is the one place that knows how the layers fit together:
//! keys → signer + cipher → issuer → validator → guard.

use sealgate_crypto::{ClaimsSigner, EnvelopeCipher};
use sealgate_protocol::{BearerToken, Metadata, SubjectId};
use sealgate_session::{SessionError, SessionState, SessionValidator, TokenIssuer};
use sealgate_store::{MemoryStore, SessionStore};

use crate::{AuthGuard, ConfiguredStore, SealgateConfig, SealgateError};

/// Builder for a [`Sealgate`].
///
/// # Example
///
/// ```rust,no_run
/// use sealgate::prelude::*;
///
/// # async fn run() -> Result<(), SealgateError> {
/// let gate = Sealgate::builder(SealgateConfig::from_env()?).build().await?;
/// let token = gate.issue(&SubjectId::new("user-42")?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SealgateBuilder {
    config: SealgateConfig,
}

impl SealgateBuilder {
    pub fn new(config: SealgateConfig) -> Self {
        Self { config }
    }

    /// Builds against the store named by the config: Redis when
    /// `redis_url` is set, otherwise an in-process [`MemoryStore`].
    ///
    /// # Errors
    /// - [`SealgateError::Config`] if the config fails validation, or names
    ///   a Redis URL in a build without the `redis` feature
    /// - [`SealgateError::Store`] if Redis is unreachable
    pub async fn build(self) -> Result<Sealgate<ConfiguredStore>, SealgateError> {
        let store = match self.config.redis_url.as_deref() {
            None => ConfiguredStore::Memory(MemoryStore::new()),
            #[cfg(feature = "redis")]
            Some(url) => {
                ConfiguredStore::Redis(sealgate_store::RedisStore::connect(url).await?)
            }
            #[cfg(not(feature = "redis"))]
            Some(_) => {
                return Err(crate::ConfigError::Invalid {
                    var: "REDIS_URL",
                    reason: "built without the `redis` feature".into(),
                }
                .into());
            }
        };
        tracing::info!(backend = store.backend(), "session store ready");
        self.build_with_store(store)
    }

    /// Builds against a caller-supplied store, ignoring `redis_url`.
    pub fn build_with_store<S: SessionStore>(
        self,
        store: S,
    ) -> Result<Sealgate<S>, SealgateError> {
        let config = self.config;
        config.validate()?;

        let signer = ClaimsSigner::new(&config.signing_secret, config.claims_ttl);
        let cipher = EnvelopeCipher::new(&config.encryption_key);
        tracing::info!(
            refresh = %config.session.refresh,
            session_ttl = ?config.session.session_ttl,
            claims_ttl = ?config.claims_ttl,
            "sealgate configured"
        );

        let issuer = TokenIssuer::new(signer, cipher, store, config.session);
        let guard = AuthGuard::new(SessionValidator::new(issuer.clone()));
        Ok(Sealgate { issuer, guard })
    }
}

/// A configured issuer and guard sharing one set of keys and one store.
///
/// Clone freely: both halves are `Arc`-backed.
#[derive(Debug)]
pub struct Sealgate<S> {
    issuer: TokenIssuer<S>,
    guard: AuthGuard<SessionValidator<S>>,
}

impl Sealgate<ConfiguredStore> {
    /// Creates a builder.
    pub fn builder(config: SealgateConfig) -> SealgateBuilder {
        SealgateBuilder::new(config)
    }
}

impl<S: SessionStore> Sealgate<S> {
    /// The token issuer (login, logout, state).
    pub fn issuer(&self) -> &TokenIssuer<S> {
        &self.issuer
    }

    /// The request guard.
    pub fn guard(&self) -> &AuthGuard<SessionValidator<S>> {
        &self.guard
    }

    /// Issues a token for `subject`. Shorthand for `issuer().issue(..)`.
    pub async fn issue(&self, subject: &SubjectId) -> Result<BearerToken, SessionError> {
        self.issuer.issue(subject).await
    }

    /// Issues a token carrying `metadata`.
    pub async fn issue_with_metadata(
        &self,
        subject: &SubjectId,
        metadata: Metadata,
    ) -> Result<BearerToken, SessionError> {
        self.issuer.issue_with_metadata(subject, metadata).await
    }

    /// Ends `subject`'s session.
    pub async fn revoke(&self, subject: &SubjectId) -> Result<bool, SessionError> {
        self.issuer.revoke(subject).await
    }

    pub async fn state(&self, subject: &SubjectId) -> Result<SessionState, SessionError> {
        self.issuer.state(subject).await
    }
}

impl<S> Clone for Sealgate<S> {
    fn clone(&self) -> Self {
        Self {
            issuer: self.issuer.clone(),
            guard: self.guard.clone(),
        }
    }
}
