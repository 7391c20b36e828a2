//! Walks through a login → request → re-login → logout cycle.
//!
//! Reads the usual `JWT_SECRET` / `ENCRYPTION_KEY` / `REDIS_URL`
//! environment; without them it runs on throwaway keys and the memory
//! store. `RUST_LOG=debug` shows the per-request detail.

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use sealgate::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn load_config() -> Result<SealgateConfig, SealgateError> {
    match SealgateConfig::from_env() {
        Ok(config) => Ok(config),
        Err(ConfigError::Missing(var)) => {
            tracing::warn!(missing = var, "using throwaway demo keys");
            Ok(SealgateConfig::new(
                SigningSecret::new("login-flow-demo-secret")?,
                EncryptionKey::generate(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

fn bearer(token: &BearerToken) -> Result<HeaderMap, http::header::InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    Ok(headers)
}

/// Runs one request through the guard and reports the outcome.
async fn request<S: SessionStore>(gate: &Sealgate<S>, label: &str, headers: &HeaderMap) -> bool {
    match gate.guard().authenticate(headers).await {
        Ok(ctx) => {
            println!("{label}: 200 OK as {}", ctx.subject);
            true
        }
        Err(rejection) => {
            let response = rejection.into_response();
            println!("{label}: {} {}", response.status(), response.body());
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let gate = Sealgate::builder(load_config()?).build().await?;
    let user = SubjectId::new("user-42")?;

    let first = gate.issue(&user).await?;
    request(&gate, "first token", &bearer(&first)?).await;

    let second = gate.issue(&user).await?;
    request(&gate, "first token after re-login", &bearer(&first)?).await;
    request(&gate, "second token", &bearer(&second)?).await;

    request(&gate, "no credentials", &HeaderMap::new()).await;

    println!("state: {:?}", gate.state(&user).await?);
    gate.revoke(&user).await?;
    request(&gate, "second token after logout", &bearer(&second)?).await;
    println!("state: {:?}", gate.state(&user).await?);

    Ok(())
}
