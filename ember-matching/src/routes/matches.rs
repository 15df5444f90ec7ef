use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{Match, Message, Photo, PublicProfile, User};
use crate::schema::{matches, messages, photos, users};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessagePreview {
    pub content: String,
    pub message_type: String,
    pub sender_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MatchPreview {
    pub id: Uuid,
    pub user: PublicProfile,
    pub last_message: Option<MessagePreview>,
    pub created_at: DateTime<Utc>,
}

/// GET /matches - the caller's live matches with the other party's profile
/// and a last-message preview, newest match first
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchPreview>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let my_matches: Vec<Match> = matches::table
        .filter(matches::user1_id.eq(user.id).or(matches::user2_id.eq(user.id)))
        .filter(matches::unmatched.eq(false))
        .order(matches::created_at.desc())
        .load(&mut conn)?;

    if my_matches.is_empty() {
        return Ok(Json(ApiResponse::ok(vec![])));
    }

    let partner_ids: Vec<Uuid> = my_matches.iter().map(|m| m.other_user(user.id)).collect();

    let partners: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&partner_ids))
        .load::<User>(&mut conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut photos_by_user: HashMap<Uuid, Vec<Photo>> = HashMap::new();
    let all_photos: Vec<Photo> = photos::table
        .filter(photos::user_id.eq_any(&partner_ids))
        .order(photos::created_at.asc())
        .load(&mut conn)?;
    for photo in all_photos {
        photos_by_user.entry(photo.user_id).or_default().push(photo);
    }

    let mut previews = Vec::with_capacity(my_matches.len());
    for m in my_matches {
        let partner_id = m.other_user(user.id);
        // A partner row can be gone mid-request if an admin deleted the
        // account; skip the orphaned match instead of failing the list.
        let Some(partner) = partners.get(&partner_id) else {
            continue;
        };

        let last: Option<Message> = messages::table
            .filter(messages::match_id.eq(m.id))
            .order(messages::created_at.desc())
            .first(&mut conn)
            .optional()?;

        previews.push(MatchPreview {
            id: m.id,
            user: PublicProfile::from_user(
                partner,
                photos_by_user.remove(&partner_id).unwrap_or_default(),
            ),
            last_message: last.map(|msg| MessagePreview {
                content: msg.content,
                message_type: msg.message_type,
                sender_id: msg.sender_id,
                created_at: msg.created_at,
            }),
            created_at: m.created_at,
        });
    }

    Ok(Json(ApiResponse::ok(previews)))
}

#[derive(Debug, Deserialize)]
pub struct UnmatchRequest {
    pub match_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UnmatchResponse {
    pub success: bool,
}

/// POST /matches/unmatch - tombstone a match. Idempotent: unmatching an
/// already-unmatched pair is a no-op success.
pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UnmatchRequest>,
) -> AppResult<Json<ApiResponse<UnmatchResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record: Match = matches::table
        .find(req.match_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    if !record.involves(user.id) {
        return Err(AppError::new(
            ErrorCode::NotMatchParticipant,
            "not authorized to unmatch",
        ));
    }

    if !record.unmatched {
        diesel::update(matches::table.find(record.id))
            .set(matches::unmatched.eq(true))
            .execute(&mut conn)?;

        publisher::publish_match_unmatched(&state.rabbitmq, record.id, user.id).await;
    }

    Ok(Json(ApiResponse::ok(UnmatchResponse { success: true })))
}
