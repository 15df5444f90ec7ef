use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use diesel::dsl::min;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::{NewPhoto, Photo};
use crate::schema::photos;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub url: String,
}

/// POST /photos - attach a photo URL to the caller's profile. Uploads
/// themselves go through the external media store; only the resulting URL
/// lands here.
pub async fn add_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPhotoRequest>,
) -> AppResult<Json<ApiResponse<Photo>>> {
    let url = req.url.trim().to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::new(ErrorCode::ValidationError, "photo url must be http(s)"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let photo: Photo = diesel::insert_into(photos::table)
        .values(&NewPhoto { user_id: user.id, url })
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(photo)))
}

fn load_owned_photo(
    conn: &mut diesel::pg::PgConnection,
    photo_id: Uuid,
    owner_id: Uuid,
) -> AppResult<Photo> {
    let photo: Option<Photo> = photos::table.find(photo_id).first(conn).optional()?;
    match photo {
        Some(p) if p.user_id == owner_id => Ok(p),
        _ => Err(AppError::new(ErrorCode::PhotoNotFound, "photo not found")),
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoActionResponse {
    pub success: bool,
}

/// DELETE /photos/:id
pub async fn delete_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PhotoActionResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let photo = load_owned_photo(&mut conn, photo_id, user.id)?;
    diesel::delete(photos::table.find(photo.id)).execute(&mut conn)?;

    Ok(Json(ApiResponse::ok(PhotoActionResponse { success: true })))
}

/// PUT /photos/:id/main - promote a photo to the front of the created_at
/// ordering, which is what "main photo" means everywhere else.
pub async fn set_main_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PhotoActionResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let photo = load_owned_photo(&mut conn, photo_id, user.id)?;

    let earliest: Option<DateTime<Utc>> = photos::table
        .filter(photos::user_id.eq(user.id))
        .select(min(photos::created_at))
        .first(&mut conn)?;

    if let Some(earliest) = earliest {
        if earliest < photo.created_at {
            diesel::update(photos::table.find(photo.id))
                .set(photos::created_at.eq(earliest - Duration::seconds(1)))
                .execute(&mut conn)?;
        }
    }

    Ok(Json(ApiResponse::ok(PhotoActionResponse { success: true })))
}
