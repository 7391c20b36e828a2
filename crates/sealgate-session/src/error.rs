//! Error types for the session layer.

use sealgate_crypto::CryptoError;
use sealgate_protocol::{ProtocolError, SubjectId};
use sealgate_store::StoreError;

/// Errors that can occur while issuing, validating or revoking a session.
///
/// The variants are deliberately fine-grained so the server can log
/// exactly why a request was refused. None of that detail should reach
/// the client: the HTTP layer collapses every variant into one uniform
/// rejection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No bearer credential was presented at all.
    #[error("missing credentials")]
    MissingCredentials,

    /// The presented token does not have the `ciphertext.nonce.tag`
    /// shape (wrong segment count, bad encoding, legacy layout).
    #[error("malformed token: {0}")]
    MalformedToken(#[from] ProtocolError),

    /// The envelope did not authenticate under the server key: tampered,
    /// forged, or sealed with a different key.
    #[error("token decryption failed")]
    DecryptionFailed(#[source] CryptoError),

    /// The decrypted claims failed signature or expiry checks.
    #[error("invalid claims")]
    InvalidClaims(#[source] CryptoError),

    /// The token is genuine but is not the current session for its
    /// subject (superseded by a reissue, revoked, or expired in the store).
    #[error("session mismatch for subject {0}")]
    SessionMismatch(SubjectId),

    /// The session store failed or timed out. Always fails the request.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    /// Signing or encryption failed while minting a token.
    #[error("token issuance failed: {0}")]
    Crypto(#[from] CryptoError),
}

impl SessionError {
    /// A stable, low-cardinality label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::MalformedToken(_) => "malformed_token",
            Self::DecryptionFailed(_) => "decryption_failed",
            Self::InvalidClaims(_) => "invalid_claims",
            Self::SessionMismatch(_) => "session_mismatch",
            Self::Store(_) => "store",
            Self::Crypto(_) => "crypto",
        }
    }

    /// The subject the failure is about, when it is known.
    ///
    /// Only [`SessionMismatch`](Self::SessionMismatch) carries one: every
    /// earlier failure happens before the claims have been verified, so
    /// any subject in them is untrusted.
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            Self::SessionMismatch(subject) => Some(subject),
            _ => None,
        }
    }

    /// Returns `true` if no credential was presented, as opposed to a
    /// credential that was presented and refused.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, Self::MissingCredentials)
    }
}
