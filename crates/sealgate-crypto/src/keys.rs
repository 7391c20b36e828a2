//! Key material wrappers.
//!
//! Both types own their bytes, wipe them on drop, and print nothing
//! useful through `Debug`.

use std::fmt;

use rand::Rng;
use zeroize::Zeroize;

use crate::CryptoError;

/// Size of an AES-256 key, in bytes.
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// EncryptionKey
// ---------------------------------------------------------------------------

/// A 256-bit symmetric key for [`EnvelopeCipher`](crate::EnvelopeCipher).
#[derive(Clone)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Builds a key from exactly [`KEY_LEN`] raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "encryption key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Parses a key from its configured string form.
    ///
    /// Accepted forms:
    /// - 64 hex characters (preferred), or
    /// - exactly 32 bytes used verbatim, for keys kept as plain
    ///   32-character strings.
    pub fn parse(value: &str) -> Result<Self, CryptoError> {
        if value.len() == KEY_LEN * 2 {
            let mut key = [0u8; KEY_LEN];
            if hex::decode_to_slice(value, &mut key).is_ok() {
                return Ok(Self(key));
            }
            key.zeroize();
        }
        if value.len() == KEY_LEN {
            return Self::from_bytes(value.as_bytes());
        }
        Err(CryptoError::InvalidKey(format!(
            "encryption key must be {} hex characters or {KEY_LEN} bytes, got {} bytes",
            KEY_LEN * 2,
            value.len()
        )))
    }

    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self(rand::rng().random())
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// SigningSecret
// ---------------------------------------------------------------------------

/// The HMAC secret used by [`ClaimsSigner`](crate::ClaimsSigner).
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wraps a secret. Empty secrets are rejected: HMAC with an empty key
    /// would let anyone mint valid claims.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(CryptoError::InvalidKey(
                "signing secret must not be empty".into(),
            ));
        }
        Ok(Self(secret))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SigningSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}
