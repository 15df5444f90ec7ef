use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::matching::canonical_pair;
use crate::models::{Block, NewBlock};
use crate::schema::{blocks, matches, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocked_id: Uuid,
}

/// POST /blocks - suppress another user. Any live match between the pair is
/// tombstoned in the same transaction. Re-blocking is idempotent.
pub async fn create_block(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BlockRequest>,
) -> AppResult<Json<ApiResponse<Block>>> {
    if req.blocked_id == user.id {
        return Err(AppError::new(ErrorCode::CannotBlockSelf, "cannot block yourself"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let block = conn.transaction::<Block, AppError, _>(|conn| {
        let target: Option<Uuid> = users::table
            .find(req.blocked_id)
            .select(users::id)
            .first(conn)
            .optional()?;
        if target.is_none() {
            return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
        }

        diesel::insert_into(blocks::table)
            .values(&NewBlock { blocker_id: user.id, blocked_id: req.blocked_id })
            .on_conflict((blocks::blocker_id, blocks::blocked_id))
            .do_nothing()
            .execute(conn)?;

        let (user1_id, user2_id) = canonical_pair(user.id, req.blocked_id);
        diesel::update(
            matches::table
                .filter(matches::user1_id.eq(user1_id))
                .filter(matches::user2_id.eq(user2_id))
                .filter(matches::unmatched.eq(false)),
        )
        .set(matches::unmatched.eq(true))
        .execute(conn)?;

        let block: Block = blocks::table
            .filter(blocks::blocker_id.eq(user.id))
            .filter(blocks::blocked_id.eq(req.blocked_id))
            .first(conn)?;

        Ok(block)
    })?;

    publisher::publish_block_created(&state.rabbitmq, user.id, req.blocked_id).await;

    Ok(Json(ApiResponse::ok(block)))
}

#[derive(Debug, Serialize)]
pub struct UnblockResponse {
    pub success: bool,
}

/// DELETE /blocks/:blocked_id - remove the caller's block edge
pub async fn remove_block(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(blocked_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UnblockResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let deleted = diesel::delete(
        blocks::table
            .filter(blocks::blocker_id.eq(user.id))
            .filter(blocks::blocked_id.eq(blocked_id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::not_found("block not found"));
    }

    Ok(Json(ApiResponse::ok(UnblockResponse { success: true })))
}
