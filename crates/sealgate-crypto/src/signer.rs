//! Claims signing and verification (HS256 JWTs).

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use sealgate_protocol::{Claims, Metadata, SubjectId};

use crate::{CryptoError, SigningSecret};

/// How long signed claims stay valid unless configured otherwise: 24 hours.
pub const DEFAULT_CLAIMS_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Produces and verifies signed, time-bound [`Claims`].
///
/// The algorithm is pinned to HS256 on both sides: a token whose header
/// names any other algorithm (including `none`) fails verification.
/// Expiry is checked with zero leeway.
pub struct ClaimsSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl ClaimsSigner {
    /// Creates a signer whose claims expire `lifetime` after issuance.
    pub fn new(secret: &SigningSecret, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    /// The configured claims lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Signs claims for `subject` issued now, with no metadata.
    pub fn sign(
        &self,
        subject: &SubjectId,
        nonce: &str,
    ) -> Result<String, CryptoError> {
        self.sign_with(subject, nonce, &Metadata::new(), get_current_timestamp())
    }

    /// Signs claims with explicit metadata and issuance time
    /// (seconds since the Unix epoch).
    ///
    /// `exp` is always `issued_at + lifetime`; there is no way to mint
    /// claims with an arbitrary expiry.
    pub fn sign_with(
        &self,
        subject: &SubjectId,
        nonce: &str,
        metadata: &Metadata,
        issued_at: u64,
    ) -> Result<String, CryptoError> {
        let claims = Claims {
            sub: subject.clone(),
            nonce: nonce.to_owned(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.lifetime.as_secs()),
            meta: metadata.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(CryptoError::Signing)
    }

    /// Verifies a claims string and returns the decoded claims.
    ///
    /// # Errors
    /// [`CryptoError::InvalidSession`] for every failure. The specific
    /// cause is only visible in `debug` logs.
    pub fn verify(&self, token: &str) -> Result<Claims, CryptoError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "claims verification failed");
                CryptoError::InvalidSession
            })
    }
}

impl fmt::Debug for ClaimsSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimsSigner")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
