//! Authenticated envelope encryption.
//!
//! AES-256-GCM with a 16-byte nonce and a detached 16-byte tag. The
//! 16-byte nonce (rather than GCM's usual 12) is what the token format
//! has always carried, so the cipher is instantiated with `U16` as its
//! nonce size.

use std::fmt;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce, Tag};
use sealgate_protocol::EncryptedEnvelope;

use crate::{CryptoError, EncryptionKey};

/// AES-256-GCM parameterized with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Seals and opens byte strings under a fixed server-held key.
///
/// Every [`encrypt`](Self::encrypt) call draws a fresh nonce from the OS
/// RNG; there is no API for supplying one. Nonce reuse under one key
/// would break both confidentiality and integrity, and at 128 random bits
/// a collision is not a practical concern.
#[derive(Clone)]
pub struct EnvelopeCipher {
    aead: Aes256Gcm16,
}

impl EnvelopeCipher {
    /// Creates a cipher bound to `key` for its whole lifetime.
    pub fn new(key: &EncryptionKey) -> Self {
        let key = Key::<Aes256Gcm16>::from_slice(key.as_bytes());
        Self {
            aead: Aes256Gcm16::new(key),
        }
    }

    /// Encrypts `plaintext`, returning ciphertext, nonce and tag separately.
    ///
    /// # Errors
    /// [`CryptoError::EncryptionFailed`] if the AEAD rejects the input
    /// (plaintexts beyond GCM's size limit).
    pub fn encrypt(
        &self,
        plaintext: &[u8],
    ) -> Result<EncryptedEnvelope, CryptoError> {
        let nonce = Aes256Gcm16::generate_nonce(&mut OsRng);
        let mut buffer = plaintext.to_vec();

        let tag = self
            .aead
            .encrypt_in_place_detached(&nonce, b"", &mut buffer)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(EncryptedEnvelope {
            ciphertext: buffer,
            nonce: nonce.into(),
            tag: tag.into(),
        })
    }

    /// Decrypts an envelope, verifying the tag first.
    ///
    /// # Errors
    /// [`CryptoError::DecryptionFailed`] on any tag mismatch, including
    /// a modified ciphertext, nonce or tag, or the wrong key. No partial
    /// plaintext is ever returned.
    pub fn decrypt(
        &self,
        envelope: &EncryptedEnvelope,
    ) -> Result<Vec<u8>, CryptoError> {
        let nonce = Nonce::<U16>::from_slice(&envelope.nonce);
        let tag = Tag::<U16>::from_slice(&envelope.tag);
        let mut buffer = envelope.ciphertext.clone();

        self.aead
            .decrypt_in_place_detached(nonce, b"", &mut buffer, tag)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        Ok(buffer)
    }

    /// Decrypts an envelope whose plaintext must be UTF-8 (a signed JWT).
    pub fn decrypt_to_string(
        &self,
        envelope: &EncryptedEnvelope,
    ) -> Result<String, CryptoError> {
        let bytes = self.decrypt(envelope)?;
        String::from_utf8(bytes).map_err(|_| CryptoError::DecryptionFailed)
    }
}

impl fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! The cipher must reject any single-bit change to the envelope.
    //! Each part (ciphertext, nonce, tag) gets its own tamper test.

    use super::*;

    fn cipher() -> EnvelopeCipher {
        EnvelopeCipher::new(&EncryptionKey::parse(&"42".repeat(32)).unwrap())
    }

    #[test]
    fn test_encrypt_then_decrypt_returns_plaintext() {
        let c = cipher();
        let env = c.encrypt(b"header.payload.signature").unwrap();

        let plain = c.decrypt(&env).expect("should decrypt");

        assert_eq!(plain, b"header.payload.signature");
        // GCM is a stream mode: ciphertext length equals plaintext length.
        assert_eq!(env.ciphertext.len(), plain.len());
    }

    #[test]
    fn test_encrypt_uses_fresh_nonce_each_call() {
        let c = cipher();
        let a = c.encrypt(b"same input").unwrap();
        let b = c.encrypt(b"same input").unwrap();

        assert_ne!(a.nonce, b.nonce, "nonce must never repeat");
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_decrypt_flipped_ciphertext_bit_fails() {
        let c = cipher();
        let mut env = c.encrypt(b"payload").unwrap();
        env.ciphertext[0] ^= 0x01;

        assert!(matches!(c.decrypt(&env), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_flipped_nonce_bit_fails() {
        let c = cipher();
        let mut env = c.encrypt(b"payload").unwrap();
        env.nonce[15] ^= 0x80;

        assert!(matches!(c.decrypt(&env), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_flipped_tag_bit_fails() {
        let c = cipher();
        let mut env = c.encrypt(b"payload").unwrap();
        env.tag[7] ^= 0x10;

        assert!(matches!(c.decrypt(&env), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_decrypt_with_other_key_fails() {
        let env = cipher().encrypt(b"payload").unwrap();
        let other = EnvelopeCipher::new(&EncryptionKey::generate());

        assert!(other.decrypt(&env).is_err());
    }

    #[test]
    fn test_decrypt_to_string_rejects_non_utf8() {
        let c = cipher();
        let env = c.encrypt(&[0xff, 0xfe, 0xfd]).unwrap();

        assert!(matches!(
            c.decrypt_to_string(&env),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_encrypt_empty_plaintext_round_trips() {
        let c = cipher();
        let env = c.encrypt(b"").unwrap();
        assert!(env.ciphertext.is_empty());
        assert_eq!(c.decrypt(&env).unwrap(), Vec::<u8>::new());
    }
}
