//! # Sealgate
//!
//! Encrypted, revocable session tokens for HTTP services.
//!
//! A bearer token is a signed claims blob (HS256 JWT) sealed with
//! AES-256-GCM. The server keeps the one current token per subject in a
//! session store, so issuing a new token, or revoking, instantly
//! invalidates every earlier one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sealgate::prelude::*;
//!
//! # async fn run(headers: http::HeaderMap) -> Result<(), SealgateError> {
//! let gate = Sealgate::builder(SealgateConfig::from_env()?).build().await?;
//!
//! // At login:
//! let token = gate.issue(&SubjectId::new("user-42")?).await?;
//!
//! // On every request:
//! match gate.guard().authenticate(&headers).await {
//!     Ok(ctx) => println!("hello {}", ctx.subject),
//!     Err(rejection) => { let _response = rejection.into_response(); }
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
mod guard;
mod rejection;
mod store;

pub use builder::{Sealgate, SealgateBuilder};
pub use config::{ConfigError, MAX_TTL, SealgateConfig};
pub use error::SealgateError;
pub use guard::{AuthGuard, Authenticated, bearer_token};
pub use rejection::{Rejection, RejectionBody};
pub use store::ConfiguredStore;

/// Convenience re-exports for common usage.
///
/// ```rust
/// use sealgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AuthGuard, Authenticated, ConfigError, ConfiguredStore, Rejection, Sealgate,
        SealgateBuilder, SealgateConfig, SealgateError,
    };
    pub use sealgate_crypto::{EncryptionKey, SigningSecret};
    pub use sealgate_protocol::{BearerToken, Metadata, SubjectId};
    pub use sealgate_session::{
        AuthContext, Authenticator, RefreshPolicy, SessionConfig, SessionError, SessionState,
        SessionValidator, TokenIssuer,
    };
    pub use sealgate_store::{MemoryStore, SessionStore};
}
