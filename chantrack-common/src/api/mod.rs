//! HTTP API bodies shared between the service and its clients
//!
//! Plain serde types only; no HTTP framework dependencies.

pub mod types;

pub use types::{CheckChannelRequest, ErrorBody, ErrorResponse, MessageResponse};
