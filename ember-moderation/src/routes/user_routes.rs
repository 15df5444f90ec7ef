use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{NewReport, Report};
use crate::schema::{reports, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub target_id: Uuid,
    pub reason: String,
}

/// POST /reports - report another user for moderation review
pub async fn create_report(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    if req.target_id == user.id {
        return Err(AppError::new(ErrorCode::CannotReportSelf, "cannot report yourself"));
    }

    let reason = req.reason.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "report reason is required"));
    }
    if reason.len() > 1000 {
        return Err(AppError::new(ErrorCode::ValidationError, "report reason max 1000 characters"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let target: Option<Uuid> = users::table
        .find(req.target_id)
        .select(users::id)
        .first(&mut conn)
        .optional()?;
    if target.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound, "reported user not found"));
    }

    let report: Report = diesel::insert_into(reports::table)
        .values(&NewReport {
            reporter_id: user.id,
            target_id: req.target_id,
            reason,
        })
        .get_result(&mut conn)?;

    publisher::publish_report_created(&state.rabbitmq, &report).await;

    Ok(Json(ApiResponse::ok(report)))
}
