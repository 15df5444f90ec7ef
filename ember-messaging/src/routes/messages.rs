use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{Match, Message, NewMessage};
use crate::schema::{matches, messages, photos, users};
use crate::AppState;

const MAX_CONTENT_LEN: usize = 2000;
const PREVIEW_LEN: usize = 80;

// --- Helpers ---

/// Load a match and verify the caller is one of its two participants.
fn load_match_for(
    conn: &mut diesel::pg::PgConnection,
    match_id: Uuid,
    user_id: Uuid,
) -> AppResult<Match> {
    let record: Match = matches::table
        .find(match_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    if !record.involves(user_id) {
        return Err(AppError::new(
            ErrorCode::NotMatchParticipant,
            "not authorized to access this chat",
        ));
    }

    Ok(record)
}

#[derive(Debug, Serialize, Clone)]
pub struct SenderPreview {
    pub id: Uuid,
    pub name: String,
    pub photo_url: Option<String>,
}

fn sender_previews(
    conn: &mut diesel::pg::PgConnection,
    record: &Match,
) -> AppResult<HashMap<Uuid, SenderPreview>> {
    let ids = vec![record.user1_id, record.user2_id];

    let names: Vec<(Uuid, String)> = users::table
        .filter(users::id.eq_any(&ids))
        .select((users::id, users::name))
        .load(conn)?;

    let mut previews: HashMap<Uuid, SenderPreview> = names
        .into_iter()
        .map(|(id, name)| (id, SenderPreview { id, name, photo_url: None }))
        .collect();

    // Main photo = earliest photo per user.
    let user_photos: Vec<(Uuid, String)> = photos::table
        .filter(photos::user_id.eq_any(&ids))
        .order(photos::created_at.asc())
        .select((photos::user_id, photos::url))
        .load(conn)?;
    for (user_id, url) in user_photos {
        if let Some(preview) = previews.get_mut(&user_id) {
            if preview.photo_url.is_none() {
                preview.photo_url = Some(url);
            }
        }
    }

    Ok(previews)
}

// --- Response DTOs ---

#[derive(Debug, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<SenderPreview>,
}

// --- Handlers ---

/// GET /matches/:match_id/messages - chronological chat history
pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<MessageView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record = load_match_for(&mut conn, match_id, user.id)?;
    let previews = sender_previews(&mut conn, &record)?;

    let history: Vec<Message> = messages::table
        .filter(messages::match_id.eq(match_id))
        .order(messages::created_at.asc())
        .load(&mut conn)?;

    let views = history
        .into_iter()
        .map(|message| {
            let sender = previews.get(&message.sender_id).cloned();
            MessageView { message, sender }
        })
        .collect();

    Ok(Json(ApiResponse::ok(views)))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub match_id: Uuid,
    pub content: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

fn default_message_type() -> String {
    "text".into()
}

/// POST /messages - send a message inside a live match
pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<MessageView>>> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message content is required"));
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            format!("message content max {MAX_CONTENT_LEN} characters"),
        ));
    }
    if req.message_type != "text" && req.message_type != "image" {
        return Err(AppError::new(ErrorCode::ValidationError, "message_type must be 'text' or 'image'"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record = load_match_for(&mut conn, req.match_id, user.id)?;

    if record.unmatched {
        return Err(AppError::new(ErrorCode::MatchUnmatched, "match has been unmatched"));
    }

    let receiver_id = record.other_user(user.id);

    let message: Message = diesel::insert_into(messages::table)
        .values(&NewMessage {
            match_id: req.match_id,
            sender_id: user.id,
            receiver_id,
            content,
            message_type: req.message_type,
        })
        .get_result(&mut conn)?;

    let previews = sender_previews(&mut conn, &record)?;
    let sender = previews.get(&user.id).cloned();

    let preview: String = message.content.chars().take(PREVIEW_LEN).collect();
    publisher::publish_message_sent(&state.rabbitmq, &message, &preview).await;

    Ok(Json(ApiResponse::ok(MessageView { message, sender })))
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: usize,
}

/// POST /matches/:match_id/read - mark all inbound messages as read
pub async fn mark_read(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MarkReadResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    load_match_for(&mut conn, match_id, user.id)?;

    let updated = diesel::update(
        messages::table
            .filter(messages::match_id.eq(match_id))
            .filter(messages::receiver_id.eq(user.id))
            .filter(messages::read.eq(false)),
    )
    .set(messages::read.eq(true))
    .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok(MarkReadResponse { success: true, updated })))
}
