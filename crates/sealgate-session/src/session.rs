//! Session types: configuration, lifecycle state and the authenticated
//! context handed back to callers.

use std::fmt;
use std::time::Duration;

use sealgate_protocol::{BearerToken, Metadata, SubjectId};

// ---------------------------------------------------------------------------
// RefreshPolicy
// ---------------------------------------------------------------------------

/// What a successful validation does to the session it validated.
///
/// ```text
///   Disabled  → nothing; the session dies `session_ttl` after issue
///   Sliding   → store TTL reset to `session_ttl` on every valid request
///   Rotate    → a fresh token replaces the presented one on every request
/// ```
///
/// Sliding never outlives the claims: once the signed `exp` passes the
/// token is rejected no matter how recently the store entry was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Leave the store entry untouched.
    Disabled,

    /// Extend the store entry's expiry. A failed extension is logged and
    /// does not fail the request.
    #[default]
    Sliding,

    /// Issue a replacement token and return it in
    /// [`AuthContext::rotated`]. The presented token stops working
    /// immediately. A failed rotation fails the request.
    Rotate,
}

impl RefreshPolicy {
    /// The lowercase name used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Sliding => "sliding",
            Self::Rotate => "rotate",
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
///
/// The claims lifetime is not here: it belongs to the
/// [`ClaimsSigner`](sealgate_crypto::ClaimsSigner) that stamps it into
/// every token.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session record lives in the store after issue (or
    /// after the last sliding refresh).
    ///
    /// Default: 24 hours.
    pub session_ttl: Duration,

    /// What a successful validation does. Default: [`RefreshPolicy::Sliding`].
    pub refresh: RefreshPolicy,

    /// Upper bound on every individual store call.
    ///
    /// Default: 2 seconds.
    pub store_timeout: Duration,

    /// Prepended to the subject id to form the store key.
    ///
    /// Default: `"session:"`.
    pub key_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(24 * 60 * 60),
            refresh: RefreshPolicy::default(),
            store_timeout: Duration::from_secs(2),
            key_prefix: "session:".to_owned(),
        }
    }
}

impl SessionConfig {
    /// The store key holding `subject`'s current token.
    pub fn key_for(&self, subject: &SubjectId) -> String {
        format!("{}{}", self.key_prefix, subject)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a subject's session currently stands, as seen by the store.
///
/// ```text
///   Unissued ──(issue)──→ Active ──(valid request, per policy)──→ Active
///       ↑                   │
///       └──(ttl / revoke)───┘
/// ```
///
/// A reissue keeps the subject `Active` but supersedes the earlier token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live record for the subject.
    Unissued,

    /// A live record exists. `ttl` is the time until the store drops it,
    /// or `None` if the backend reports no expiry.
    Active { ttl: Option<Duration> },
}

impl SessionState {
    /// Returns `true` if the subject has a live session.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

// ---------------------------------------------------------------------------
// AuthContext
// ---------------------------------------------------------------------------

/// The identity resolved from a valid bearer token.
///
/// Request-scoped: returned by value from every successful validation and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Who made the request.
    pub subject: SubjectId,

    /// Metadata sealed into the token at issue.
    pub metadata: Metadata,

    /// When the presented token was issued (seconds since the Unix epoch).
    pub issued_at: u64,

    /// When the presented token's claims expire (seconds since the Unix epoch).
    pub expires_at: u64,

    /// The replacement token, under [`RefreshPolicy::Rotate`]. The client
    /// must use it for its next request.
    pub rotated: Option<BearerToken>,
}
