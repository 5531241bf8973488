//! Per-address rate limiting
//!
//! A keyed GCRA limiter (governor) allowing `max_requests` per `window` for
//! each client IP, with the whole quota available as a burst. This is a
//! coarse fairness guard, not part of the correctness model.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chantrack_common::{Error, Result};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Rate limiter keyed by client IP
pub type IpRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Tracked addresses above which stale entries are pruned
const PRUNE_THRESHOLD: usize = 10_000;

/// Build a limiter allowing `max_requests` per `window` for each address
pub fn build_rate_limiter(max_requests: u32, window: Duration) -> Result<IpRateLimiter> {
    let burst = NonZeroU32::new(max_requests)
        .ok_or_else(|| Error::Config("rate limit max requests must be non-zero".to_string()))?;

    let quota = Quota::with_period(window / max_requests)
        .ok_or_else(|| Error::Config("rate limit window too short".to_string()))?
        .allow_burst(burst);

    Ok(RateLimiter::keyed(quota))
}

/// Rejects requests from addresses that used up their quota
///
/// Requests without a peer address (no `ConnectInfo`) are let through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = peer {
        if state.rate_limiter.len() > PRUNE_THRESHOLD {
            state.rate_limiter.retain_recent();
        }

        if state.rate_limiter.check_key(&ip).is_err() {
            warn!(client = %ip, path = %request.uri().path(), "Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }
    }

    Ok(next.run(request).await)
}
