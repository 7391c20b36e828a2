//! Core protocol types for Sealgate's bearer tokens.
//!
//! A bearer token is built in three layers, innermost first:
//!
//! ```text
//! Claims ──(sign)──→ JWT string ──(encrypt)──→ EncryptedEnvelope ──(encode)──→ BearerToken
//! ```
//!
//! This module defines the data at each layer. Signing and encryption
//! live in `sealgate-crypto`; the string encoding lives in [`crate::codec`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::ProtocolError;

/// Length of the AES-GCM nonce carried in every token, in bytes.
pub const NONCE_LEN: usize = 16;

/// Length of the AES-GCM authentication tag carried in every token, in bytes.
pub const TAG_LEN: usize = 16;

/// Free-form string metadata a caller can attach to a session at issue
/// time. It travels inside the signed claims and comes back out in the
/// authenticated context.
///
/// A `BTreeMap` (not `HashMap`) keeps the key order stable, so the same
/// metadata always serializes to the same JSON.
pub type Metadata = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// SubjectId
// ---------------------------------------------------------------------------

/// Identifies whoever a session belongs to (usually a user id).
///
/// Newtype over `String` so a subject can't be confused with a token or a
/// store key in function signatures. The only rule is that it is
/// non-empty; an empty subject would map every anonymous caller onto the
/// same session record.
///
/// Serialized as a plain JSON string. Deserialization goes through
/// [`TryFrom<String>`], so claims carrying `"sub": ""` fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a subject id, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, ProtocolError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ProtocolError::InvalidSubject);
        }
        Ok(Self(id))
    }

    /// Borrows the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// The signed identity payload sealed inside every bearer token.
///
/// Field names follow the registered JWT claim names so the signer can
/// validate `exp` and require `sub` without any custom logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Who the session belongs to.
    pub sub: SubjectId,

    /// Hex-encoded per-issuance entropy. Two tokens issued for the same
    /// subject in the same second still differ because of this field.
    pub nonce: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,

    /// Caller-supplied metadata. Omitted from the JSON when empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: Metadata,
}

// ---------------------------------------------------------------------------
// EncryptedEnvelope
// ---------------------------------------------------------------------------

/// The output of authenticated encryption over a signed claims string.
///
/// The nonce and tag are fixed-size arrays rather than `Vec<u8>`: a
/// wrong-length nonce or tag is a parse error, never something that can
/// reach the cipher.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// The encrypted claims, without the tag.
    pub ciphertext: Vec<u8>,
    /// Random per-encryption nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Detached authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl fmt::Debug for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedEnvelope")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("nonce", &hex::encode(self.nonce))
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// BearerToken
// ---------------------------------------------------------------------------

/// A serialized, client-facing session token.
///
/// `Display` yields the raw token (that's what goes into the
/// `Authorization` header). `Debug` deliberately does not, so a token
/// that ends up in a `{:?}` log line is not leaked.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps an already-serialized token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrows the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the token string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Compares against another token string in constant time.
    ///
    /// Used for the "is this still the current session?" check, where the
    /// other side is attacker-controlled input.
    pub fn ct_eq(&self, other: &str) -> bool {
        self.0.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(<{} bytes>)", self.0.len())
    }
}

impl From<BearerToken> for String {
    fn from(token: BearerToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    //! Tests for protocol types and their JSON shapes.
    //!
    //! The claims JSON is what gets signed, so its exact shape is part of
    //! the token format.

    use super::*;

    // =====================================================================
    // SubjectId
    // =====================================================================

    #[test]
    fn test_subject_id_new_empty_returns_error() {
        assert!(matches!(
            SubjectId::new(""),
            Err(ProtocolError::InvalidSubject)
        ));
    }

    #[test]
    fn test_subject_id_serializes_as_plain_string() {
        let id = SubjectId::new("user-42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user-42\"");
    }

    #[test]
    fn test_subject_id_deserialize_empty_is_rejected() {
        let result: Result<SubjectId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err(), "empty subject must not deserialize");
    }

    #[test]
    fn test_subject_id_display_is_raw_value() {
        assert_eq!(SubjectId::new("alice").unwrap().to_string(), "alice");
    }

    // =====================================================================
    // Claims
    // =====================================================================

    #[test]
    fn test_claims_empty_metadata_is_omitted() {
        let claims = Claims {
            sub: SubjectId::new("u1").unwrap(),
            nonce: "ab".into(),
            iat: 10,
            exp: 20,
            meta: Metadata::new(),
        };

        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("meta").is_none(), "empty meta should be skipped");
        assert_eq!(json["sub"], "u1");
        assert_eq!(json["exp"], 20);
    }

    #[test]
    fn test_claims_missing_metadata_defaults_to_empty() {
        let json = r#"{"sub":"u1","nonce":"ab","iat":1,"exp":2}"#;

        let claims: Claims = serde_json::from_str(json).unwrap();

        assert!(claims.meta.is_empty());
    }

    #[test]
    fn test_claims_metadata_survives_json() {
        let mut meta = Metadata::new();
        meta.insert("role".into(), "admin".into());
        let claims = Claims {
            sub: SubjectId::new("u1").unwrap(),
            nonce: "ab".into(),
            iat: 1,
            exp: 2,
            meta,
        };

        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();

        assert_eq!(back.meta.get("role").map(String::as_str), Some("admin"));
    }

    // =====================================================================
    // BearerToken
    // =====================================================================

    #[test]
    fn test_bearer_token_debug_does_not_leak_value() {
        let token = BearerToken::new("secret-token-value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-token-value"));
    }

    #[test]
    fn test_bearer_token_ct_eq_matches_only_identical() {
        let token = BearerToken::new("abc.def.012");
        assert!(token.ct_eq("abc.def.012"));
        assert!(!token.ct_eq("abc.def.013"));
        assert!(!token.ct_eq("abc.def.0123"), "length mismatch is unequal");
        assert!(!token.ct_eq(""));
    }

    #[test]
    fn test_encrypted_envelope_debug_hides_ciphertext() {
        let env = EncryptedEnvelope {
            ciphertext: vec![0xde, 0xad],
            nonce: [0; NONCE_LEN],
            tag: [0; TAG_LEN],
        };
        let debug = format!("{env:?}");
        assert!(debug.contains("ciphertext_len: 2"));
        assert!(!debug.contains("tag"));
    }
}
