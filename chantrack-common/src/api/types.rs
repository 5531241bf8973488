//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Message returned when a channel is recorded for the first time
pub const CHANNEL_INSERTED_MESSAGE: &str = "Channel ID inserted successfully.";

/// Message returned when the channel was already recorded
pub const DUPLICATE_CHANNEL_MESSAGE: &str = "Duplicate channel ID found.";

/// Body of `POST /checkChannel`
///
/// ```
/// use chantrack_common::api::CheckChannelRequest;
///
/// let request: CheckChannelRequest =
///     serde_json::from_str(r#"{"url": "https://www.youtube.com/channel/UC123"}"#).unwrap();
/// assert_eq!(request.url, "https://www.youtube.com/channel/UC123");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckChannelRequest {
    /// Any YouTube URL: channel, user, custom (`/c/`) or watch page
    pub url: String,
}

/// Success body carrying a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn inserted() -> Self {
        Self::new(CHANNEL_INSERTED_MESSAGE)
    }

    pub fn duplicate() -> Self {
        Self::new(DUPLICATE_CHANNEL_MESSAGE)
    }
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code (e.g. `UNAUTHORIZED`)
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
