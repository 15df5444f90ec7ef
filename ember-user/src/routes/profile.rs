use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::profile::PreferencesUpdate;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{AccountView, Photo, UpdateUser, User};
use crate::schema::{photos, users};
use crate::AppState;

fn load_user(conn: &mut diesel::pg::PgConnection, user_id: uuid::Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

fn load_photos(conn: &mut diesel::pg::PgConnection, user_id: uuid::Uuid) -> AppResult<Vec<Photo>> {
    Ok(photos::table
        .filter(photos::user_id.eq(user_id))
        .order(photos::created_at.asc())
        .load(conn)?)
}

/// GET /me - the caller's own account
pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<AccountView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let account = load_user(&mut conn, user.id)?;
    let photos = load_photos(&mut conn, user.id)?;

    Ok(Json(ApiResponse::ok(AccountView::from_user(&account, photos))))
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 18, max = 120, message = "age must be between 18 and 120"))]
    pub age: Option<i32>,
    #[validate(length(max = 500, message = "bio max 500 characters"))]
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preferences: Option<PreferencesUpdate>,
}

/// PATCH /me - partial profile and preferences update
pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<AccountView>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let current = load_user(&mut conn, user.id)?;

    let preferences = req
        .preferences
        .as_ref()
        .map(|update| current.preferences().merge(update).to_json());

    let changes = UpdateUser {
        name: req.name,
        age: req.age,
        bio: req.bio,
        height_cm: req.height_cm,
        interests: req.interests.map(|tags| serde_json::json!(tags)),
        latitude: req.latitude,
        longitude: req.longitude,
        preferences,
        onboarding_complete: None,
        last_active_at: Some(Utc::now()),
    };

    let updated: User = diesel::update(users::table.find(user.id))
        .set(&changes)
        .get_result(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id).await;

    let photos = load_photos(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(AccountView::from_user(&updated, photos))))
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct OnboardingRequest {
    #[validate(length(max = 500, message = "bio max 500 characters"))]
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    pub preferences: Option<PreferencesUpdate>,
}

/// POST /onboarding - one-way transition to the discoverable state.
/// Only onboarded profiles appear in (or receive) the discovery feed.
pub async fn complete_onboarding(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<OnboardingRequest>,
) -> AppResult<Json<ApiResponse<AccountView>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let current = load_user(&mut conn, user.id)?;

    let preferences = req
        .preferences
        .as_ref()
        .map(|update| current.preferences().merge(update).to_json());

    let changes = UpdateUser {
        bio: req.bio,
        height_cm: req.height_cm,
        preferences,
        onboarding_complete: Some(true),
        last_active_at: Some(Utc::now()),
        ..Default::default()
    };

    let updated: User = diesel::update(users::table.find(user.id))
        .set(&changes)
        .get_result(&mut conn)?;

    if !current.onboarding_complete {
        publisher::publish_onboarding_completed(&state.rabbitmq, updated.id, &updated.name).await;
    }

    let photos = load_photos(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(AccountView::from_user(&updated, photos))))
}
