//! Error types for the crypto layer.

/// Errors from key handling, encryption, and claims signing.
///
/// Verification failures are deliberately coarse. A forged signature, a
/// malformed JWT and an expired one all come back as
/// [`CryptoError::InvalidSession`], so nothing downstream can turn the
/// distinction into a client-visible oracle.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Key or secret material had the wrong size or encoding.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// The AEAD refused to encrypt (only possible for absurd input sizes).
    #[error("envelope encryption failed")]
    EncryptionFailed,

    /// Tag mismatch, wrong key, or a plaintext that is not UTF-8.
    #[error("envelope decryption failed")]
    DecryptionFailed,

    /// Producing the claims JWT failed.
    #[error("claims signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The claims did not verify: bad signature, bad structure, or expired.
    #[error("invalid session claims")]
    InvalidSession,
}
