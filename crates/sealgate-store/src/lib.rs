//! Session store abstraction for Sealgate.
//!
//! Provides the [`SessionStore`] trait: the minimal key-value contract the
//! session layer needs to keep one canonical bearer token per subject.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process map, for tests and single-node setups.
//! - [`RedisStore`] (feature `redis`, default): multiplexed async Redis
//!   connection.
//!
//! # Atomicity
//!
//! The session protocol relies on single-key `set` and `get` being atomic
//! at the store level, and accepts last-writer-wins between concurrent
//! `set`s on the same key. Both backends provide that.

mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

use std::future::Future;
use std::time::Duration;

/// A key-value store with per-key expiry.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one store is shared by every request task
///   for the lifetime of the server.
/// - Each method returns a `Send` future, so generic callers can
///   `tokio::spawn` work that awaits the store.
///
/// Implementors can write the methods as plain `async fn`.
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the live value for `key`, or `None` if absent or expired.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any previous value, expiring
    /// after `ttl`.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Resets the expiry of an existing key to `ttl` from now.
    ///
    /// Returns `false` if the key does not exist (nothing to extend).
    fn expire(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Returns the remaining lifetime of `key`, or `None` if the key is
    /// absent or has no expiry.
    fn ttl(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Duration>, StoreError>> + Send;

    /// Removes `key`. Returns `true` if a live value was removed.
    fn delete(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Removes every key. Administrative and test use only.
    fn flush(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Rounds a TTL up to whole seconds, with a floor of one second.
///
/// Redis expiries are whole seconds and `EX 0` is an error; rounding up
/// means a session never expires earlier than requested.
pub fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
