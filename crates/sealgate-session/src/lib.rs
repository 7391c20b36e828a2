//! Session lifecycle for Sealgate.
//!
//! This crate composes the lower layers into the two operations a server
//! actually performs:
//!
//! 1. **Issuing**: minting a bearer token for a subject and recording it
//!    as that subject's only valid session ([`TokenIssuer`])
//! 2. **Validating**: checking a presented token against the keys and
//!    the store, and applying the refresh policy ([`SessionValidator`],
//!    behind the [`Authenticator`] trait)
//!
//! plus revocation (logout) and state inspection on the issuer.
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP guard (above)  ← extracts the bearer token, turns errors into 401s
//!     ↕
//! Session layer (this crate)  ← issue / validate / revoke
//!     ↕
//! Crypto + Protocol + Store (below)  ← sign, seal, encode, persist
//! ```

mod auth;
mod error;
mod issuer;
mod session;

pub use auth::{Authenticator, SessionValidator};
pub use error::SessionError;
pub use issuer::TokenIssuer;
pub use session::{AuthContext, RefreshPolicy, SessionConfig, SessionState};
