//! Codec trait and implementation for the bearer-token string layout.
//!
//! A "codec" converts between an [`EncryptedEnvelope`] and the string a
//! client carries around. The session layer doesn't care how the three
//! envelope parts are glued together; it just needs something that
//! implements [`TokenCodec`].
//!
//! [`DotCodec`] is the only layout we produce:
//!
//! ```text
//! base64(ciphertext) "." hex(nonce) "." hex(tag)
//! ```
//!
//! Each part is independently decodable, and none of the encodings can
//! contain a `.`, so splitting on dots is unambiguous.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{
    BearerToken, EncryptedEnvelope, NONCE_LEN, ProtocolError, TAG_LEN,
};

/// Separator between token segments.
const DELIMITER: char = '.';

/// Converts sealed envelopes to bearer-token strings and back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one codec value is shared by every request task.
/// - `'static` → it lives as long as the issuer/validator holding it.
pub trait TokenCodec: Send + Sync + 'static {
    /// Serializes an envelope into a bearer token. Infallible: every
    /// envelope has a string form.
    fn encode(&self, envelope: &EncryptedEnvelope) -> BearerToken;

    /// Parses a presented token string back into an envelope.
    ///
    /// # Errors
    /// Any [`ProtocolError`] describing why the string is not a
    /// well-formed token. No cryptography happens here.
    fn decode(&self, token: &str) -> Result<EncryptedEnvelope, ProtocolError>;
}

// ---------------------------------------------------------------------------
// TokenLayout
// ---------------------------------------------------------------------------

/// The token layouts that have existed in the wild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLayout {
    /// `ciphertext.nonce.tag`, key held server-side. The current layout.
    Sealed,

    /// `ciphertext.keyMaterial.nonce.tag`. Key material travels inside
    /// the token, so anyone holding the token can decrypt it. Recognized
    /// only so it can be refused with a clear log message.
    InlineKey,
}

impl TokenLayout {
    /// Guesses the layout from the segment count alone.
    ///
    /// Returns `None` for any count that never corresponded to a layout.
    pub fn detect(token: &str) -> Option<Self> {
        let count = token.split(DELIMITER).count();
        [Self::Sealed, Self::InlineKey]
            .into_iter()
            .find(|layout| layout.segment_count() == count)
    }

    /// Number of dot-separated segments in this layout.
    pub fn segment_count(self) -> usize {
        match self {
            Self::Sealed => 3,
            Self::InlineKey => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// DotCodec
// ---------------------------------------------------------------------------

/// A [`TokenCodec`] for the [`TokenLayout::Sealed`] layout.
///
/// Nonce and tag are lowercase hex, and `decode` refuses uppercase
/// digits, so every envelope has exactly one token spelling.
///
/// ## Example
///
/// ```rust
/// use sealgate_protocol::{DotCodec, EncryptedEnvelope, TokenCodec};
///
/// let codec = DotCodec;
/// let envelope = EncryptedEnvelope {
///     ciphertext: b"opaque".to_vec(),
///     nonce: [7; 16],
///     tag: [9; 16],
/// };
///
/// let token = codec.encode(&envelope);
/// assert_eq!(token.as_str().split('.').count(), 3);
///
/// let decoded = codec.decode(token.as_str()).unwrap();
/// assert_eq!(decoded, envelope);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DotCodec;

impl TokenCodec for DotCodec {
    fn encode(&self, envelope: &EncryptedEnvelope) -> BearerToken {
        BearerToken::new(format!(
            "{ct}{DELIMITER}{nonce}{DELIMITER}{tag}",
            ct = STANDARD.encode(&envelope.ciphertext),
            nonce = hex::encode(envelope.nonce),
            tag = hex::encode(envelope.tag),
        ))
    }

    fn decode(&self, token: &str) -> Result<EncryptedEnvelope, ProtocolError> {
        let segments: Vec<&str> = token.split(DELIMITER).collect();

        match TokenLayout::detect(token) {
            Some(TokenLayout::Sealed) => {}
            Some(TokenLayout::InlineKey) => {
                return Err(ProtocolError::LegacyLayout);
            }
            None => {
                return Err(ProtocolError::WrongSegmentCount {
                    found: segments.len(),
                });
            }
        }

        let [ct, nonce, tag] = segments[..] else {
            return Err(ProtocolError::WrongSegmentCount {
                found: segments.len(),
            });
        };

        let ciphertext = decode_base64("ciphertext", ct)?;
        let nonce = decode_hex::<NONCE_LEN>("nonce", nonce)?;
        let tag = decode_hex::<TAG_LEN>("tag", tag)?;

        Ok(EncryptedEnvelope {
            ciphertext,
            nonce,
            tag,
        })
    }
}

fn decode_base64(
    segment: &'static str,
    value: &str,
) -> Result<Vec<u8>, ProtocolError> {
    if value.is_empty() {
        return Err(ProtocolError::EmptySegment { segment });
    }
    STANDARD
        .decode(value)
        .map_err(|_| ProtocolError::InvalidEncoding { segment })
}

/// Decodes a hex segment into a fixed-size array.
///
/// `N` is a const generic: the caller picks the array length at compile
/// time (`decode_hex::<16>(...)`), and the length check happens here
/// before any decoding.
fn decode_hex<const N: usize>(
    segment: &'static str,
    value: &str,
) -> Result<[u8; N], ProtocolError> {
    if value.is_empty() {
        return Err(ProtocolError::EmptySegment { segment });
    }
    if value.len() != N * 2 {
        return Err(ProtocolError::InvalidLength {
            segment,
            expected: N * 2,
            found: value.len(),
        });
    }
    if value.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(ProtocolError::InvalidEncoding { segment });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out)
        .map_err(|_| ProtocolError::InvalidEncoding { segment })?;
    Ok(out)
}
