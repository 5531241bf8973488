//! YouTube URL to channel id resolution
//!
//! Patterns are tried in a fixed order and the first match wins:
//!
//! 1. `/channel/<id>`: the id itself, no lookup
//! 2. `/user/<name>` or `/c/<name>`: `channels?forUsername=<name>`
//! 3. `watch?v=<video>`: the video's `snippet.channelId`
//!
//! A URL that matches nothing, or whose lookup comes back empty, is
//! unresolved (`Ok(None)`). A failing lookup is an error, so callers can
//! tell bad input from a broken upstream.

use crate::youtube::{ChannelMetadataApi, MetadataError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

static CHANNEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)channel/([A-Za-z0-9_-]+)").expect("Failed to compile channel regex")
});

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)(?:user|c)/([A-Za-z0-9_-]+)").expect("Failed to compile username regex")
});

static VIDEO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"watch\?v=([A-Za-z0-9_-]+)").expect("Failed to compile video regex")
});

/// What a URL points at, before any lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelUrl {
    ChannelId(String),
    Username(String),
    VideoId(String),
}

/// Classify a URL by the first matching pattern
pub fn classify_url(url: &str) -> Option<ChannelUrl> {
    let capture = |pattern: &Regex| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    if let Some(id) = capture(&CHANNEL_PATTERN) {
        return Some(ChannelUrl::ChannelId(id));
    }
    if let Some(name) = capture(&USERNAME_PATTERN) {
        return Some(ChannelUrl::Username(name));
    }
    capture(&VIDEO_PATTERN).map(ChannelUrl::VideoId)
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Channel lookup failed: {0}")]
    Lookup(#[from] MetadataError),
}

/// Resolves URLs to channel ids, consulting the metadata API when needed
pub struct ChannelResolver {
    metadata: Arc<dyn ChannelMetadataApi>,
}

impl ChannelResolver {
    pub fn new(metadata: Arc<dyn ChannelMetadataApi>) -> Self {
        Self { metadata }
    }

    pub async fn resolve(&self, url: &str) -> Result<Option<String>, ResolveError> {
        let channel_id = match classify_url(url) {
            Some(ChannelUrl::ChannelId(id)) => Some(id),
            Some(ChannelUrl::Username(name)) => {
                self.metadata.channel_id_for_username(&name).await?
            }
            Some(ChannelUrl::VideoId(video_id)) => {
                self.metadata.channel_id_for_video(&video_id).await?
            }
            None => None,
        };

        debug!(url, channel_id = ?channel_id, "Resolved URL");
        Ok(channel_id)
    }
}
