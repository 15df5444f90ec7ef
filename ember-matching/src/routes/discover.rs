use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::matching::discovery::OnboardingGate;
use crate::models::{Photo, PublicProfile, User};
use crate::schema::{photos, users};
use crate::services::discovery_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

fn default_page() -> u64 { 1 }
fn default_limit() -> u64 { 50 }

#[derive(Debug, Serialize)]
pub struct CandidateProfile {
    #[serde(flatten)]
    pub profile: PublicProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<i32>,
    pub is_online: bool,
}

/// GET /discover?page=&limit= - the paginated candidate feed
pub async fn discover(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
) -> AppResult<Json<ApiResponse<Vec<CandidateProfile>>>> {
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let requester: User = users::table
        .find(user.id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    if !requester.onboarding_complete {
        return match state.config.discovery_onboarding_gate {
            OnboardingGate::Service => Ok(Json(ApiResponse::ok(vec![]))),
            OnboardingGate::Api => Err(AppError::new(
                ErrorCode::OnboardingIncomplete,
                "complete onboarding to start discovering",
            )),
        };
    }

    let feed = discovery_service::build_feed(
        &mut conn,
        state.config.discovery_gender_policy,
        state.config.discovery_exclude_matched,
        &requester,
        page,
        limit,
    )?;

    // Batch-load candidate photos, ordered so the first one is the main photo.
    let candidate_ids: Vec<Uuid> = feed.iter().map(|c| c.user.id).collect();
    let mut photos_by_user: HashMap<Uuid, Vec<Photo>> = HashMap::new();
    if !candidate_ids.is_empty() {
        let all_photos: Vec<Photo> = photos::table
            .filter(photos::user_id.eq_any(&candidate_ids))
            .order(photos::created_at.asc())
            .load(&mut conn)?;
        for photo in all_photos {
            photos_by_user.entry(photo.user_id).or_default().push(photo);
        }
    }

    // Presence lives in Redis, keyed by the external gateway.
    let presence_keys: Vec<String> = candidate_ids.iter().map(|id| format!("online:{id}")).collect();
    let online = state
        .redis
        .exists_multi(&presence_keys)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "presence lookup failed");
            vec![false; candidate_ids.len()]
        });

    let show_distance = requester.preferences().show_my_distance;

    let results = feed
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| {
            let photos = photos_by_user.remove(&candidate.user.id).unwrap_or_default();
            CandidateProfile {
                profile: PublicProfile::from_user(&candidate.user, photos),
                distance_km: if show_distance {
                    candidate.distance_km.map(|km| km.round() as i32)
                } else {
                    None
                },
                is_online: online.get(i).copied().unwrap_or(false),
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(results)))
}
