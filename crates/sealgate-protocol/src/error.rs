//! Error types for the protocol layer.
//!
//! Each crate in Sealgate defines its own error enum. A `ProtocolError`
//! always means "the token string has the wrong shape", and it is raised
//! before any key material is touched.

/// Errors that can occur while parsing or building protocol values.
///
/// None of these are ever shown to a client verbatim. The guard collapses
/// them into a single generic rejection; the variants exist so the server
/// logs can say *why* a token was refused.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The token did not split into the expected number of
    /// dot-separated segments.
    #[error("expected 3 token segments, found {found}")]
    WrongSegmentCount { found: usize },

    /// One of the segments was empty (e.g. `"abc..ff"`).
    #[error("token segment `{segment}` is empty")]
    EmptySegment { segment: &'static str },

    /// A segment was not valid base64 (ciphertext) or hex (nonce, tag).
    #[error("token segment `{segment}` is not validly encoded")]
    InvalidEncoding { segment: &'static str },

    /// A hex segment decoded, but to the wrong number of bytes.
    ///
    /// `expected` and `found` are counted in hex characters, which is
    /// what an operator sees when eyeballing a token.
    #[error(
        "token segment `{segment}` has {found} hex characters, expected {expected}"
    )]
    InvalidLength {
        segment: &'static str,
        expected: usize,
        found: usize,
    },

    /// The token uses the old 4-segment layout that carries key material
    /// inline. Such tokens are refused outright and never decrypted.
    #[error("legacy inline-key token layout is not accepted")]
    LegacyLayout,

    /// A subject identifier was empty.
    #[error("subject id must not be empty")]
    InvalidSubject,
}
