use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult};
use ember_shared::types::ApiResponse;

use crate::schema::users;
use crate::AppState;

const PRESENCE_TTL_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
pub struct PresenceUpdate {
    pub user_id: Uuid,
    pub is_online: bool,
}

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub success: bool,
}

/// POST /internal/presence - called by the connection gateway when a user's
/// socket opens or closes. Redis is the source of truth for "online now";
/// last_active_at on the row is the durable trace.
pub async fn update_presence(
    State(state): State<Arc<AppState>>,
    Json(update): Json<PresenceUpdate>,
) -> AppResult<Json<ApiResponse<PresenceResponse>>> {
    let key = format!("online:{}", update.user_id);

    if update.is_online {
        if let Err(e) = state.redis.set(&key, "1", PRESENCE_TTL_SECS).await {
            tracing::warn!(error = %e, user_id = %update.user_id, "failed to set presence key");
        }
    } else if let Err(e) = state.redis.del(&key).await {
        tracing::warn!(error = %e, user_id = %update.user_id, "failed to clear presence key");
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    diesel::update(users::table.find(update.user_id))
        .set(users::last_active_at.eq(Utc::now()))
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok(PresenceResponse { success: true })))
}
