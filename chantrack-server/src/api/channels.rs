//! Channel submission and history endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chantrack_common::api::{CheckChannelRequest, MessageResponse};
use chantrack_common::db::{self, ChannelRecord, InsertOutcome};
use tracing::info;

use crate::api::auth::AuthenticatedCaller;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /checkChannel
///
/// Resolves `url` to a channel id and records it for the caller.
/// 201 when the channel is new, 200 when it was already recorded (by anyone).
pub async fn check_channel(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    payload: Result<Json<CheckChannelRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let channel_id = state
        .resolver
        .resolve(&request.url)
        .await?
        .ok_or_else(|| ApiError::InvalidInput("Invalid YouTube URL".to_string()))?;

    if db::channel_exists(&state.db, &channel_id).await? {
        info!(channel_id = %channel_id, submitted_by = %caller.display_name, "Duplicate channel");
        return Ok((StatusCode::OK, Json(MessageResponse::duplicate())));
    }

    match db::insert_channel(&state.db, &channel_id, &caller.display_name).await? {
        InsertOutcome::Inserted => {
            info!(channel_id = %channel_id, created_by = %caller.display_name, "Channel recorded");
            Ok((StatusCode::CREATED, Json(MessageResponse::inserted())))
        }
        InsertOutcome::AlreadyPresent => {
            // Another request recorded it between our check and insert
            info!(channel_id = %channel_id, submitted_by = %caller.display_name, "Duplicate channel (concurrent insert)");
            Ok((StatusCode::OK, Json(MessageResponse::duplicate())))
        }
    }
}

/// GET /influencerHistory
///
/// Channels first submitted by the caller.
pub async fn influencer_history(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> ApiResult<Json<Vec<ChannelRecord>>> {
    let records = db::channels_created_by(&state.db, &caller.display_name).await?;
    Ok(Json(records))
}
