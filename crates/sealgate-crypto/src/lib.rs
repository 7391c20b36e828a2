//! Cryptographic building blocks for Sealgate tokens.
//!
//! Two independent pieces, composed by the session layer:
//!
//! 1. **[`ClaimsSigner`]**: turns a subject id plus fresh entropy into a
//!    signed, time-bound claims string (an HS256 JWT), and verifies it.
//! 2. **[`EnvelopeCipher`]**: seals that string with AES-256-GCM under a
//!    server-held key, producing an [`EncryptedEnvelope`].
//!
//! ```text
//! Claims ──ClaimsSigner::sign──→ JWT ──EnvelopeCipher::encrypt──→ EncryptedEnvelope
//! ```
//!
//! Both hold only immutable key material after construction, so a single
//! instance can be shared by every request task without locking.
//!
//! [`EncryptedEnvelope`]: sealgate_protocol::EncryptedEnvelope

mod cipher;
mod error;
mod keys;
mod signer;

pub use cipher::EnvelopeCipher;
pub use error::CryptoError;
pub use keys::{EncryptionKey, KEY_LEN, SigningSecret};
pub use signer::{ClaimsSigner, DEFAULT_CLAIMS_LIFETIME};
