//! Caller identity verification
//!
//! Callers present a Google ID token as a bearer credential. The token is
//! checked against Google's token-info endpoint, which validates signature
//! and expiry; we additionally require the audience to be our OAuth client
//! id and the issuer to be Google.
//!
//! Verification is a single call with no retry. Any rejection is terminal
//! for the request.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("chantrack/", env!("CARGO_PKG_VERSION"));

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Verified caller, derived per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Provider's canonical display name (`name` claim)
    pub display_name: String,
}

impl CallerIdentity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// Identity verification errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No usable `Authorization: Bearer` header
    #[error("Missing bearer credential")]
    MissingCredential,

    /// The provider (or our claim checks) refused the credential
    #[error("Credential rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered with garbage
    #[error("Identity provider failure: {0}")]
    Provider(String),
}

/// Turns a bearer credential into a [`CallerIdentity`]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError>;
}

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively. Returns `None` for a missing
/// header, another scheme, or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Claims returned by the token-info endpoint (only what we read)
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    name: Option<String>,
}

/// Verifies Google ID tokens through the token-info endpoint
pub struct GoogleIdentityVerifier {
    http_client: Client,
    tokeninfo_url: String,
    client_id: String,
}

impl GoogleIdentityVerifier {
    pub fn new(
        client_id: String,
        tokeninfo_url: String,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        Ok(Self {
            http_client,
            tokeninfo_url,
            client_id,
        })
    }

    fn check_claims(&self, info: TokenInfo) -> Result<CallerIdentity, IdentityError> {
        match info.aud.as_deref() {
            Some(aud) if aud == self.client_id => {}
            other => {
                return Err(IdentityError::Rejected(format!(
                    "audience mismatch (got {:?})",
                    other
                )))
            }
        }

        match info.iss.as_deref() {
            Some(iss) if GOOGLE_ISSUERS.contains(&iss) => {}
            other => {
                return Err(IdentityError::Rejected(format!(
                    "unexpected issuer {:?}",
                    other
                )))
            }
        }

        match info.name {
            Some(name) if !name.trim().is_empty() => Ok(CallerIdentity::new(name)),
            _ => Err(IdentityError::Rejected("token carries no name claim".to_string())),
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let response = self
            .http_client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            // without_url(): the request URL carries the token
            .map_err(|e| IdentityError::Provider(e.without_url().to_string()))?;

        let status = response.status();

        // Invalid, expired or malformed tokens come back as 400
        if status.is_client_error() {
            debug!(status = status.as_u16(), "Token-info rejected credential");
            return Err(IdentityError::Rejected(format!("token-info returned {}", status)));
        }

        if !status.is_success() {
            return Err(IdentityError::Provider(format!("token-info returned {}", status)));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(e.without_url().to_string()))?;

        self.check_claims(info)
    }
}
