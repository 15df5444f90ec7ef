use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::profile::{Gender, Preferences};
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{AccountView, NewUser, User};
use crate::schema::users;
use crate::services::account_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 18, max = 120, message = "age must be between 18 and 120"))]
    pub age: i32,
    pub gender: Gender,
    #[validate(length(max = 500, message = "bio max 500 characters"))]
    pub bio: Option<String>,
    pub height_cm: Option<i32>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// POST /register - create an account. Token issuance lives with the
/// identity provider; the response carries only the new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AccountView>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    account_service::validate_password(&req.password)?;
    let password_hash = account_service::hash_password(&req.password)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let email = req.email.to_lowercase();
    let exists: bool = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if exists {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    let new_user = NewUser {
        email,
        password_hash: Some(password_hash),
        name: req.name,
        age: req.age,
        gender: req.gender.to_string(),
        bio: req.bio,
        height_cm: req.height_cm,
        interests: serde_json::json!(req.interests),
        latitude: req.latitude,
        longitude: req.longitude,
        preferences: Preferences::default().to_json(),
    };

    let user: User = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)?;

    publisher::publish_user_registered(&state.rabbitmq, user.id, &user.email).await;

    tracing::info!(user_id = %user.id, email = %user.email, "user registered");

    Ok(Json(ApiResponse::ok(AccountView::from_user(&user, vec![]))))
}
