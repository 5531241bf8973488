//! chantrack-server library
//!
//! Accepts YouTube URLs from the browser extension, resolves them to channel
//! ids, and records each channel once together with the caller who first
//! submitted it.

pub mod api;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod youtube;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::rate_limit::IpRateLimiter;
use crate::identity::IdentityVerifier;
use crate::resolver::ChannelResolver;

/// Application state shared across HTTP handlers
///
/// Built once in `main` and cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Bearer credential verifier
    pub verifier: Arc<dyn IdentityVerifier>,
    /// URL to channel id resolver
    pub resolver: Arc<ChannelResolver>,
    /// Per-address request limiter
    pub rate_limiter: Arc<IpRateLimiter>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        verifier: Arc<dyn IdentityVerifier>,
        resolver: Arc<ChannelResolver>,
        rate_limiter: Arc<IpRateLimiter>,
    ) -> Self {
        Self {
            db,
            verifier,
            resolver,
            rate_limiter,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Channel routes authenticate per handler and sit behind the rate limiter.
/// `/health` is public and unlimited.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let channel_routes = Router::new()
        .route("/checkChannel", post(api::check_channel))
        .route("/influencerHistory", get(api::influencer_history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::rate_limit_middleware,
        ));

    Router::new()
        .merge(channel_routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
