//! Authentication extractor
//!
//! Handlers that take an [`AuthenticatedCaller`] argument only run once the
//! bearer credential has been verified. Extraction happens before the JSON
//! body is parsed, so an unauthenticated request gets 401 regardless of
//! what it sent.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::identity::{bearer_token, CallerIdentity, IdentityError};
use crate::AppState;

/// Verified caller of the current request
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(IdentityError::MissingCredential)?;
        let identity = state.verifier.verify(token).await?;
        Ok(Self(identity))
    }
}
