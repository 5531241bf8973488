//! HTTP API handlers for chantrack-server

pub mod auth;
pub mod channels;
pub mod cors;
pub mod health;
pub mod rate_limit;

pub use auth::AuthenticatedCaller;
pub use channels::{check_channel, influencer_history};
pub use cors::cors_layer;
pub use health::health_routes;
pub use rate_limit::{build_rate_limiter, rate_limit_middleware};
