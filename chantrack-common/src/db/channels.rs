//! Channel store
//!
//! Point lookup, conditional insert and per-submitter listing over the
//! `channels` table. Uniqueness is global on `channel_id`: the same channel
//! submitted by two different callers is still a duplicate.

use super::models::ChannelRecord;
use crate::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

/// Result of [`insert_channel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written
    Inserted,
    /// A row with this channel id already existed; nothing was written
    AlreadyPresent,
}

/// Check whether a channel id has been recorded
pub async fn channel_exists(pool: &SqlitePool, channel_id: &str) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM channels WHERE channel_id = ? LIMIT 1")
            .bind(channel_id)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

/// Record a channel as submitted by `created_by`
///
/// Callers check [`channel_exists`] first. The insert itself is still
/// conditional (`ON CONFLICT DO NOTHING`), so two requests racing past that
/// check end up with one row and one [`InsertOutcome::AlreadyPresent`].
pub async fn insert_channel(
    pool: &SqlitePool,
    channel_id: &str,
    created_by: &str,
) -> Result<InsertOutcome> {
    let result = sqlx::query(
        r#"
        INSERT INTO channels (channel_id, created_by, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(channel_id) DO NOTHING
        "#,
    )
    .bind(channel_id)
    .bind(created_by)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        debug!(channel_id, "Insert skipped, channel already recorded");
        Ok(InsertOutcome::AlreadyPresent)
    } else {
        Ok(InsertOutcome::Inserted)
    }
}

/// All channels first submitted by `created_by`, in insertion order
pub async fn channels_created_by(pool: &SqlitePool, created_by: &str) -> Result<Vec<ChannelRecord>> {
    let records = sqlx::query_as::<_, ChannelRecord>(
        "SELECT channel_id, created_by, created_at FROM channels WHERE created_by = ? ORDER BY id",
    )
    .bind(created_by)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_in_memory_database;

    #[tokio::test]
    async fn test_exists_false_on_empty_table() {
        let pool = init_in_memory_database().await.unwrap();
        assert!(!channel_exists(&pool, "UC123").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_then_exists() {
        let pool = init_in_memory_database().await.unwrap();

        let outcome = insert_channel(&pool, "UC123", "Alice").await.unwrap();

        assert_eq!(outcome, InsertOutcome::Inserted);
        assert!(channel_exists(&pool, "UC123").await.unwrap());
        assert!(!channel_exists(&pool, "UC124").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_insert_reports_already_present() {
        let pool = init_in_memory_database().await.unwrap();

        insert_channel(&pool, "UC123", "Alice").await.unwrap();
        let outcome = insert_channel(&pool, "UC123", "Bob").await.unwrap();

        assert_eq!(outcome, InsertOutcome::AlreadyPresent);

        // First submitter keeps ownership
        let alice = channels_created_by(&pool, "Alice").await.unwrap();
        let bob = channels_created_by(&pool, "Bob").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert!(bob.is_empty());
    }

    #[tokio::test]
    async fn test_exists_is_exact_match() {
        let pool = init_in_memory_database().await.unwrap();
        insert_channel(&pool, "UCabc", "Alice").await.unwrap();

        assert!(!channel_exists(&pool, "ucabc").await.unwrap());
        assert!(!channel_exists(&pool, "UCab").await.unwrap());
    }

    #[tokio::test]
    async fn test_created_by_filters_other_callers() {
        let pool = init_in_memory_database().await.unwrap();
        insert_channel(&pool, "UC1", "Alice").await.unwrap();
        insert_channel(&pool, "UC2", "Bob").await.unwrap();
        insert_channel(&pool, "UC3", "Alice").await.unwrap();

        let records = channels_created_by(&pool, "Alice").await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.channel_id.as_str()).collect();
        assert_eq!(ids, vec!["UC1", "UC3"]);
        assert!(records.iter().all(|r| r.created_by == "Alice"));
    }
}
