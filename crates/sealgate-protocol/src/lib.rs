//! Wire protocol for Sealgate.
//!
//! This crate defines everything that leaves the server inside a bearer
//! token, and how that token is laid out as a string:
//!
//! - **Types** ([`SubjectId`], [`Claims`], [`EncryptedEnvelope`],
//!   [`BearerToken`]): the structures that get signed, sealed and
//!   handed to clients.
//! - **Codec** ([`TokenCodec`] trait, [`DotCodec`]): how a sealed
//!   envelope is turned into the `ciphertext.nonce.tag` string and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while parsing a
//!   presented token.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about keys, stores or HTTP. It only
//! knows shapes and encodings:
//!
//! ```text
//! Crypto (seal/open bytes) → Protocol (token string) → Session (subject)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{DotCodec, TokenCodec, TokenLayout};
pub use error::ProtocolError;
pub use types::{
    BearerToken, Claims, EncryptedEnvelope, Metadata, NONCE_LEN, SubjectId,
    TAG_LEN,
};
