//! Startup configuration, loaded once from the environment.
//!
//! | Variable                   | Default       |
//! |----------------------------|---------------|
//! | `JWT_SECRET`               | required      |
//! | `ENCRYPTION_KEY`           | required      |
//! | `REDIS_URL`                | memory store  |
//! | `SESSION_TTL_SECS`         | 86400         |
//! | `SESSION_CLAIMS_TTL_SECS`  | 86400         |
//! | `SESSION_REFRESH`          | `sliding`     |
//! | `SESSION_STORE_TIMEOUT_MS` | 2000          |
//! | `SESSION_KEY_PREFIX`       | `session:`    |
//!
//! Both TTLs are capped at [`MAX_TTL`]. Anything missing, unparsable or
//! out of range is a [`ConfigError`] at startup. A
//! misconfigured server refuses to start rather than turning every
//! request into a 401.

use std::env;
use std::time::Duration;

use sealgate_crypto::{DEFAULT_CLAIMS_LIFETIME, EncryptionKey, SigningSecret};
use sealgate_session::{RefreshPolicy, SessionConfig};

/// Upper bound for `SESSION_TTL_SECS` and `SESSION_CLAIMS_TTL_SECS`: one
/// year.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 86_400);

/// Errors found while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    /// The store would keep sessions alive after their claims expire.
    #[error(
        "session ttl ({session:?}) must not exceed the claims lifetime ({claims:?})"
    )]
    TtlExceedsClaims { session: Duration, claims: Duration },
}

/// Everything needed to build the session components.
///
/// Holds key material; `Debug` redacts it.
#[derive(Debug)]
pub struct SealgateConfig {
    /// HS256 secret for the claims signer.
    pub signing_secret: SigningSecret,

    /// AES-256-GCM key for the envelope cipher.
    pub encryption_key: EncryptionKey,

    /// Session store URL. `None` selects the in-process memory store.
    pub redis_url: Option<String>,

    /// How long signed claims stay valid.
    pub claims_ttl: Duration,

    /// Store TTL, refresh policy, store timeout and key prefix.
    pub session: SessionConfig,
}

impl SealgateConfig {
    /// Creates a config with the given keys and every other setting at
    /// its default.
    pub fn new(signing_secret: SigningSecret, encryption_key: EncryptionKey) -> Self {
        Self {
            signing_secret,
            encryption_key,
            redis_url: None,
            claims_ttl: DEFAULT_CLAIMS_LIFETIME,
            session: SessionConfig::default(),
        }
    }

    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable
    /// name to its value. Lets tests and embedders supply settings
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let signing_secret = SigningSecret::new(secret).map_err(|e| ConfigError::Invalid {
            var: "JWT_SECRET",
            reason: e.to_string(),
        })?;

        let key = get("ENCRYPTION_KEY").ok_or(ConfigError::Missing("ENCRYPTION_KEY"))?;
        let encryption_key =
            EncryptionKey::parse(&key).map_err(|e| ConfigError::Invalid {
                var: "ENCRYPTION_KEY",
                reason: e.to_string(),
            })?;

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            session_ttl: seconds(&get, "SESSION_TTL_SECS", defaults.session_ttl)?,
            refresh: match get("SESSION_REFRESH") {
                Some(value) => parse_refresh(&value)?,
                None => defaults.refresh,
            },
            store_timeout: millis(
                &get,
                "SESSION_STORE_TIMEOUT_MS",
                defaults.store_timeout,
            )?,
            key_prefix: get("SESSION_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        };

        let config = Self {
            signing_secret,
            encryption_key,
            redis_url: get("REDIS_URL"),
            claims_ttl: seconds(&get, "SESSION_CLAIMS_TTL_SECS", DEFAULT_CLAIMS_LIFETIME)?,
            session,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field rules. Called by the loaders and again by
    /// the builder, so hand-assembled configs get the same checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        within_max("SESSION_TTL_SECS", self.session.session_ttl)?;
        within_max("SESSION_CLAIMS_TTL_SECS", self.claims_ttl)?;
        if self.session.session_ttl > self.claims_ttl {
            return Err(ConfigError::TtlExceedsClaims {
                session: self.session.session_ttl,
                claims: self.claims_ttl,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_refresh(value: &str) -> Result<RefreshPolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "disabled" | "off" | "none" => Ok(RefreshPolicy::Disabled),
        "sliding" => Ok(RefreshPolicy::Sliding),
        "rotate" => Ok(RefreshPolicy::Rotate),
        other => Err(ConfigError::Invalid {
            var: "SESSION_REFRESH",
            reason: format!("unknown policy {other:?} (expected disabled, sliding or rotate)"),
        }),
    }
}

/// Reads a positive integer variable. `None` when unset.
fn positive(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = get(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

fn within_max(var: &'static str, ttl: Duration) -> Result<(), ConfigError> {
    if ttl > MAX_TTL {
        return Err(ConfigError::Invalid {
            var,
            reason: format!(
                "{}s exceeds the maximum of {}s",
                ttl.as_secs(),
                MAX_TTL.as_secs()
            ),
        });
    }
    Ok(())
}

fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    Ok(positive(get, var)?.map_or(default, Duration::from_secs))
}

fn millis(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    Ok(positive(get, var)?.map_or(default, Duration::from_millis))
}
