//! Unified error type for Sealgate.

use sealgate_crypto::CryptoError;
use sealgate_protocol::ProtocolError;
use sealgate_session::SessionError;
use sealgate_store::StoreError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Startup code (config loading, store connection, building) and
/// application code calling the issuer can use this one type with `?`.
/// Request authentication never surfaces it: the guard turns every
/// failure into a [`Rejection`](crate::Rejection).
#[derive(Debug, thiserror::Error)]
pub enum SealgateError {
    /// Missing or invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A token or subject id could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Bad key material, or a signing/encryption failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The session store is unreachable or failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Issuing, validating or revoking a session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
