//! The store selected by configuration.

use std::time::Duration;

use sealgate_store::{MemoryStore, SessionStore, StoreError};
#[cfg(feature = "redis")]
use sealgate_store::RedisStore;

/// Either backend, chosen at startup from `REDIS_URL`.
///
/// An enum rather than a boxed trait object: [`SessionStore`] returns
/// `impl Future`, which is not object-safe.
#[derive(Debug)]
pub enum ConfiguredStore {
    Memory(MemoryStore),
    #[cfg(feature = "redis")]
    Redis(RedisStore),
}

impl ConfiguredStore {
    /// Short backend name for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "redis")]
            Self::Redis(_) => "redis",
        }
    }
}

impl SessionStore for ConfiguredStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Memory(store) => store.get(key).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set(key, value, ttl).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.set(key, value, ttl).await,
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.expire(key, ttl).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.expire(key, ttl).await,
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        match self {
            Self::Memory(store) => store.ttl(key).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.ttl(key).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.delete(key).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.delete(key).await,
        }
    }

    async fn flush(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.flush().await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.flush().await,
        }
    }
}
