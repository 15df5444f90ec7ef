use axum::extract::{Path, State};
use axum::Json;
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::{PublicProfile, User};
use crate::schema::{blocks, photos, users};
use crate::AppState;

/// GET /users/:id - another user's public profile. A block in either
/// direction hides the profile entirely; the response body does not reveal
/// that the account exists.
pub async fn get_user(
    requester: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let blocked: i64 = blocks::table
        .filter(
            blocks::blocker_id.eq(requester.id).and(blocks::blocked_id.eq(user_id))
                .or(blocks::blocker_id.eq(user_id).and(blocks::blocked_id.eq(requester.id))),
        )
        .select(count_star())
        .first(&mut conn)?;

    if blocked > 0 {
        return Err(AppError::new(ErrorCode::Forbidden, "user not found"));
    }

    let user: User = users::table
        .find(user_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let user_photos = photos::table
        .filter(photos::user_id.eq(user_id))
        .order(photos::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(PublicProfile::from_user(&user, user_photos))))
}
