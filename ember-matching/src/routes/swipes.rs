use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::matching::SwipeDirection;
use crate::models::{Match, Swipe};
use crate::services::swipe_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub target_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub swipe: Swipe,
    #[serde(rename = "match")]
    pub match_record: Option<Match>,
    pub is_match: bool,
}

/// POST /swipes/:direction - record a like/dislike/superlike on a target
pub async fn record_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(direction): Path<String>,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    let direction: SwipeDirection = direction
        .parse()
        .map_err(|e: String| AppError::new(ErrorCode::ValidationError, e))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let outcome = swipe_service::record_swipe(&mut conn, user.id, req.target_id, direction)?;

    publisher::publish_swipe_recorded(&state.rabbitmq, &outcome.swipe).await;
    if let Some(ref m) = outcome.match_outcome {
        tracing::info!(
            match_id = %m.record.id,
            swiper_id = %user.id,
            target_id = %req.target_id,
            rematch = m.rematch,
            "mutual match"
        );
        publisher::publish_match_created(&state.rabbitmq, &m.record, m.rematch).await;
    }

    let is_match = outcome.is_match();
    Ok(Json(ApiResponse::ok(SwipeResponse {
        swipe: outcome.swipe,
        match_record: outcome.match_outcome.map(|m| m.record),
        is_match,
    })))
}

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    pub success: bool,
}

/// DELETE /swipes/undo/:target_id - retract the caller's swipe on a target
pub async fn undo_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UndoResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    swipe_service::undo_swipe(&mut conn, user.id, target_id)?;

    Ok(Json(ApiResponse::ok(UndoResponse { success: true })))
}
