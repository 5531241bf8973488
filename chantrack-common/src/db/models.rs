//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A channel submitted through `/checkChannel`
///
/// One row per distinct `channel_id`, written on first submission and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    /// Canonical YouTube channel identifier (`UC...`)
    pub channel_id: String,
    /// Display name of the caller who first submitted the channel
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
