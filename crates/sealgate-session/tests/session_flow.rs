//! End-to-end session scenarios: issue, validate, tamper, reissue,
//! revoke, and misbehaving stores.
//!
//! Everything runs in-process against `MemoryStore` or a small wrapper
//! around it that injects failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sealgate_crypto::{
    ClaimsSigner, DEFAULT_CLAIMS_LIFETIME, EncryptionKey, EnvelopeCipher, SigningSecret,
};
use sealgate_protocol::{BearerToken, DotCodec, SubjectId, TokenCodec};
use sealgate_session::{
    Authenticator, RefreshPolicy, SessionConfig, SessionError, SessionValidator, TokenIssuer,
};
use sealgate_store::{MemoryStore, SessionStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SECRET: &str = "123432345432345432343";

fn validator_over<S: SessionStore>(store: S, config: SessionConfig) -> SessionValidator<S> {
    let secret = SigningSecret::new(SECRET).unwrap();
    SessionValidator::new(TokenIssuer::new(
        ClaimsSigner::new(&secret, DEFAULT_CLAIMS_LIFETIME),
        EnvelopeCipher::new(&EncryptionKey::generate()),
        store,
        config,
    ))
}

fn validator() -> SessionValidator<MemoryStore> {
    validator_over(MemoryStore::new(), SessionConfig::default())
}

fn sid(id: &str) -> SubjectId {
    SubjectId::new(id).unwrap()
}

/// Decodes `token`, lets `tamper` modify the envelope, re-encodes it.
fn tampered(
    token: &BearerToken,
    tamper: impl FnOnce(&mut sealgate_protocol::EncryptedEnvelope),
) -> String {
    let mut envelope = DotCodec.decode(token.as_str()).unwrap();
    tamper(&mut envelope);
    DotCodec.encode(&envelope).into_inner()
}

/// A store whose every call hangs forever.
struct StalledStore;

impl SessionStore for StalledStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        std::future::pending().await
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        std::future::pending().await
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        std::future::pending().await
    }
    async fn ttl(&self, _key: &str) -> Result<Option<Duration>, StoreError> {
        std::future::pending().await
    }
    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        std::future::pending().await
    }
    async fn flush(&self) -> Result<(), StoreError> {
        std::future::pending().await
    }
}

/// A working store whose `expire` always fails.
#[derive(Default)]
struct NoRefreshStore {
    inner: MemoryStore,
}

impl SessionStore for NoRefreshStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.inner.set(key, value, ttl).await
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("replica is read-only".into()))
    }
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        self.inner.ttl(key).await
    }
    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }
    async fn flush(&self) -> Result<(), StoreError> {
        self.inner.flush().await
    }
}

/// A working store that refuses every `set` after the first.
#[derive(Default)]
struct SingleWriteStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl SessionStore for SingleWriteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(StoreError::Unavailable("primary went away".into()));
        }
        self.inner.set(key, value, ttl).await
    }
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.inner.expire(key, ttl).await
    }
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        self.inner.ttl(key).await
    }
    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }
    async fn flush(&self) -> Result<(), StoreError> {
        self.inner.flush().await
    }
}

// =========================================================================
// Round trip and single active session
// =========================================================================

#[tokio::test]
async fn test_user_42_reissue_invalidates_first_token() {
    let v = validator();
    let user = sid("user-42");

    let t1 = v.issuer().issue(&user).await.unwrap();
    let ctx = v.authenticate(t1.as_str()).await.unwrap();
    assert_eq!(ctx.subject, user);

    let t2 = v.issuer().issue(&user).await.unwrap();

    let err = v.authenticate(t1.as_str()).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionMismatch(_)));
    assert_eq!(v.authenticate(t2.as_str()).await.unwrap().subject, user);
}

#[tokio::test]
async fn test_sessions_of_different_subjects_are_independent() {
    let v = validator();
    let alice = v.issuer().issue(&sid("alice")).await.unwrap();
    let bob = v.issuer().issue(&sid("bob")).await.unwrap();

    v.issuer().issue(&sid("alice")).await.unwrap();

    assert!(v.authenticate(alice.as_str()).await.is_err());
    assert_eq!(v.authenticate(bob.as_str()).await.unwrap().subject, sid("bob"));
}

// =========================================================================
// Tampering
// =========================================================================

#[tokio::test]
async fn test_tampered_ciphertext_fails_decryption() {
    let v = validator();
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    let forged = tampered(&token, |e| e.ciphertext[0] ^= 0x01);

    let err = v.authenticate(&forged).await.unwrap_err();
    assert!(matches!(err, SessionError::DecryptionFailed(_)));
}

#[tokio::test]
async fn test_tampered_nonce_fails_decryption() {
    let v = validator();
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    let forged = tampered(&token, |e| e.nonce[15] ^= 0x80);

    let err = v.authenticate(&forged).await.unwrap_err();
    assert!(matches!(err, SessionError::DecryptionFailed(_)));
}

#[tokio::test]
async fn test_one_hex_char_of_tag_altered_fails_decryption() {
    let v = validator();
    let token = v.issuer().issue(&sid("user-42")).await.unwrap();

    // Swap the last character of the tag segment for a different hex digit.
    let mut forged = token.as_str().to_owned();
    let last = forged.pop().unwrap();
    forged.push(if last == '0' { '1' } else { '0' });

    let err = v.authenticate(&forged).await.unwrap_err();
    assert!(matches!(err, SessionError::DecryptionFailed(_)));

    // The genuine token is unaffected.
    assert!(v.authenticate(token.as_str()).await.is_ok());
}

#[tokio::test]
async fn test_truncated_tag_is_malformed() {
    let v = validator();
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    let forged = &token.as_str()[..token.as_str().len() - 2];

    let err = v.authenticate(forged).await.unwrap_err();
    assert!(matches!(err, SessionError::MalformedToken(_)));
}

// =========================================================================
// Expiry and revocation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_store_ttl_elapsed_rejects_token() {
    let v = validator_over(
        MemoryStore::new(),
        SessionConfig {
            session_ttl: Duration::from_secs(60),
            refresh: RefreshPolicy::Disabled,
            ..SessionConfig::default()
        },
    );
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;

    let err = v.authenticate(token.as_str()).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionMismatch(_)));
}

#[tokio::test(start_paused = true)]
async fn test_sliding_refresh_keeps_active_session_alive() {
    let v = validator_over(
        MemoryStore::new(),
        SessionConfig {
            session_ttl: Duration::from_secs(60),
            refresh: RefreshPolicy::Sliding,
            ..SessionConfig::default()
        },
    );
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    // Four requests 45s apart: 180s in total, well past the 60s ttl.
    for _ in 0..4 {
        tokio::time::advance(Duration::from_secs(45)).await;
        v.authenticate(token.as_str()).await.unwrap();
    }
}

#[tokio::test]
async fn test_revoke_then_authenticate_is_rejected() {
    let v = validator();
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    assert!(v.issuer().revoke(&sid("u")).await.unwrap());

    assert!(v.authenticate(token.as_str()).await.is_err());
    assert!(!v.issuer().state(&sid("u")).await.unwrap().is_active());
}

// =========================================================================
// Store failures
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stalled_store_issue_times_out() {
    let v = validator_over(StalledStore, SessionConfig::default());

    let err = v.issuer().issue(&sid("u")).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Store(StoreError::Timeout(d)) if d == Duration::from_secs(2)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_store_authenticate_fails_closed() {
    // Mint a genuine token with a working store, then validate it with the
    // same keys against a store that never answers.
    let secret = SigningSecret::new(SECRET).unwrap();
    let key = EncryptionKey::generate();
    let working = SessionValidator::new(TokenIssuer::new(
        ClaimsSigner::new(&secret, DEFAULT_CLAIMS_LIFETIME),
        EnvelopeCipher::new(&key),
        MemoryStore::new(),
        SessionConfig::default(),
    ));
    let stalled = SessionValidator::new(TokenIssuer::new(
        ClaimsSigner::new(&secret, DEFAULT_CLAIMS_LIFETIME),
        EnvelopeCipher::new(&key),
        StalledStore,
        SessionConfig::default(),
    ));
    let token = working.issuer().issue(&sid("u")).await.unwrap();

    let err = stalled.authenticate(token.as_str()).await.unwrap_err();

    assert!(matches!(err, SessionError::Store(StoreError::Timeout(_))));
}

#[tokio::test]
async fn test_sliding_refresh_failure_still_authenticates() {
    let v = validator_over(NoRefreshStore::default(), SessionConfig::default());
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    let ctx = v.authenticate(token.as_str()).await.unwrap();

    assert_eq!(ctx.subject, sid("u"));
}

#[tokio::test]
async fn test_rotate_failure_rejects_request() {
    let v = validator_over(
        SingleWriteStore::default(),
        SessionConfig {
            refresh: RefreshPolicy::Rotate,
            ..SessionConfig::default()
        },
    );
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    let err = v.authenticate(token.as_str()).await.unwrap_err();

    assert!(matches!(err, SessionError::Store(StoreError::Unavailable(_))));
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_authentication_of_one_token_succeeds() {
    let v = Arc::new(validator());
    let token = v.issuer().issue(&sid("u")).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..64 {
        let v = Arc::clone(&v);
        let token = token.clone();
        tasks.spawn(async move { v.authenticate(token.as_str()).await });
    }

    while let Some(result) = tasks.join_next().await {
        let ctx = result.expect("task should not panic").expect("should authenticate");
        assert_eq!(ctx.subject, sid("u"));
    }
}
