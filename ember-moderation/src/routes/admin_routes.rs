use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::middleware::AdminUser;
use ember_shared::types::api::ApiResponse;
use ember_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{AdminLog, Match, NewBlock, Report, Swipe, UserRef};
use crate::schema::{admin_logs, blocks, matches, messages, photos, reports, swipes, users};
use crate::services::audit;
use crate::AppState;

// --- Shared view types ---

#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

type UserRow = (
    Uuid,
    String,
    String,
    i32,
    String,
    Option<String>,
    bool,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn user_view_columns() -> (
    users::id,
    users::email,
    users::name,
    users::age,
    users::gender,
    users::bio,
    users::is_admin,
    users::onboarding_complete,
    users::created_at,
    users::last_active_at,
) {
    (
        users::id,
        users::email,
        users::name,
        users::age,
        users::gender,
        users::bio,
        users::is_admin,
        users::onboarding_complete,
        users::created_at,
        users::last_active_at,
    )
}

impl From<UserRow> for AdminUserView {
    fn from(row: UserRow) -> Self {
        let (id, email, name, age, gender, bio, is_admin, onboarding_complete, created_at, last_active_at) = row;
        Self { id, email, name, age, gender, bio, is_admin, onboarding_complete, created_at, last_active_at }
    }
}

fn user_refs(
    conn: &mut diesel::pg::PgConnection,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, UserRef>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, String, String)> = users::table
        .filter(users::id.eq_any(ids))
        .select((users::id, users::name, users::email))
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, name, email)| (id, UserRef { id, name, email }))
        .collect())
}

// --- Users ---

/// GET /admin/users - paginated account listing, newest first
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminUserView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<UserRow> = users::table
        .select(user_view_columns())
        .order(users::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load(&mut conn)?;

    let total: i64 = users::table.count().get_result(&mut conn)?;

    let items: Vec<AdminUserView> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

#[derive(Debug, Serialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SwipeView {
    pub id: Uuid,
    pub direction: String,
    pub created_at: DateTime<Utc>,
    pub other: Option<UserRef>,
}

#[derive(Debug, Serialize)]
pub struct MatchView {
    pub id: Uuid,
    pub unmatched: bool,
    pub created_at: DateTime<Utc>,
    pub other: Option<UserRef>,
}

#[derive(Debug, Serialize)]
pub struct AdminUserDetail {
    pub user: AdminUserView,
    pub photos: Vec<PhotoView>,
    pub swipes_given: Vec<SwipeView>,
    pub swipes_received: Vec<SwipeView>,
    pub matches: Vec<MatchView>,
}

/// GET /admin/users/:id - one account with its full swipe and match history
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AdminUserDetail>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let row: UserRow = users::table
        .find(user_id)
        .select(user_view_columns())
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let user_photos: Vec<(Uuid, String, DateTime<Utc>)> = photos::table
        .filter(photos::user_id.eq(user_id))
        .order(photos::created_at.asc())
        .select((photos::id, photos::url, photos::created_at))
        .load(&mut conn)?;

    let given: Vec<Swipe> = swipes::table
        .filter(swipes::swiper_id.eq(user_id))
        .order(swipes::created_at.desc())
        .load(&mut conn)?;
    let received: Vec<Swipe> = swipes::table
        .filter(swipes::target_id.eq(user_id))
        .order(swipes::created_at.desc())
        .load(&mut conn)?;

    let match_rows: Vec<Match> = matches::table
        .filter(matches::user1_id.eq(user_id).or(matches::user2_id.eq(user_id)))
        .order(matches::created_at.desc())
        .load(&mut conn)?;

    let mut counterpart_ids: Vec<Uuid> = Vec::new();
    counterpart_ids.extend(given.iter().map(|s| s.target_id));
    counterpart_ids.extend(received.iter().map(|s| s.swiper_id));
    counterpart_ids.extend(match_rows.iter().map(|m| {
        if m.user1_id == user_id { m.user2_id } else { m.user1_id }
    }));
    counterpart_ids.sort();
    counterpart_ids.dedup();

    let refs = user_refs(&mut conn, &counterpart_ids)?;

    let detail = AdminUserDetail {
        user: row.into(),
        photos: user_photos
            .into_iter()
            .map(|(id, url, created_at)| PhotoView { id, url, created_at })
            .collect(),
        swipes_given: given
            .into_iter()
            .map(|s| SwipeView {
                id: s.id,
                direction: s.direction,
                created_at: s.created_at,
                other: refs.get(&s.target_id).cloned(),
            })
            .collect(),
        swipes_received: received
            .into_iter()
            .map(|s| SwipeView {
                id: s.id,
                direction: s.direction,
                created_at: s.created_at,
                other: refs.get(&s.swiper_id).cloned(),
            })
            .collect(),
        matches: match_rows
            .into_iter()
            .map(|m| {
                let other_id = if m.user1_id == user_id { m.user2_id } else { m.user1_id };
                MatchView {
                    id: m.id,
                    unmatched: m.unmatched,
                    created_at: m.created_at,
                    other: refs.get(&other_id).cloned(),
                }
            })
            .collect(),
    };

    Ok(Json(ApiResponse::ok(detail)))
}

#[derive(Debug, Serialize)]
pub struct AdminActionResponse {
    pub success: bool,
}

/// DELETE /admin/users/:id - hard delete; FK cascades take the owned rows
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AdminActionResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let email: Option<String> = users::table
        .find(user_id)
        .select(users::email)
        .first(&mut conn)
        .optional()?;
    let Some(email) = email else {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    };

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "delete_user",
        Some(user_id),
        Some(serde_json::json!({ "email": email })),
    )?;

    diesel::delete(users::table.find(user_id)).execute(&mut conn)?;

    publisher::publish_user_deleted(&state.rabbitmq, user_id, admin.0.id).await;

    Ok(Json(ApiResponse::ok(AdminActionResponse { success: true })))
}

// --- Swipes / matches ---

#[derive(Debug, Serialize)]
pub struct SwipeAdminView {
    #[serde(flatten)]
    pub swipe: Swipe,
    pub swiper: Option<UserRef>,
    pub target: Option<UserRef>,
}

/// GET /admin/swipes - paginated swipe log, newest first
pub async fn list_swipes(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<SwipeAdminView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items: Vec<Swipe> = swipes::table
        .order(swipes::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load(&mut conn)?;

    let total: i64 = swipes::table.count().get_result(&mut conn)?;

    let mut ids: Vec<Uuid> = items.iter().flat_map(|s| [s.swiper_id, s.target_id]).collect();
    ids.sort();
    ids.dedup();
    let refs = user_refs(&mut conn, &ids)?;

    let views: Vec<SwipeAdminView> = items
        .into_iter()
        .map(|s| SwipeAdminView {
            swiper: refs.get(&s.swiper_id).cloned(),
            target: refs.get(&s.target_id).cloned(),
            swipe: s,
        })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(views, total as u64, &params))))
}

#[derive(Debug, Serialize)]
pub struct MatchAdminView {
    #[serde(flatten)]
    pub match_record: Match,
    pub user1: Option<UserRef>,
    pub user2: Option<UserRef>,
    pub last_message: Option<String>,
}

/// GET /admin/matches - paginated match log with last-message preview
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MatchAdminView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items: Vec<Match> = matches::table
        .order(matches::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load(&mut conn)?;

    let total: i64 = matches::table.count().get_result(&mut conn)?;

    let mut ids: Vec<Uuid> = items.iter().flat_map(|m| [m.user1_id, m.user2_id]).collect();
    ids.sort();
    ids.dedup();
    let refs = user_refs(&mut conn, &ids)?;

    let mut views = Vec::with_capacity(items.len());
    for m in items {
        let last_message: Option<String> = messages::table
            .filter(messages::match_id.eq(m.id))
            .order(messages::created_at.desc())
            .select(messages::content)
            .first(&mut conn)
            .optional()?;

        views.push(MatchAdminView {
            user1: refs.get(&m.user1_id).cloned(),
            user2: refs.get(&m.user2_id).cloned(),
            last_message,
            match_record: m,
        });
    }

    Ok(Json(ApiResponse::ok(Paginated::new(views, total as u64, &params))))
}

/// POST /admin/matches/:id/unmatch - force-tombstone a match
pub async fn force_unmatch(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record: Option<Match> = matches::table.find(match_id).first(&mut conn).optional()?;
    if record.is_none() {
        return Err(AppError::new(ErrorCode::MatchNotFound, "match not found"));
    }

    audit::log_admin_action(&mut conn, admin.0.id, "force_unmatch", Some(match_id), None)?;

    let updated: Match = diesel::update(matches::table.find(match_id))
        .set(matches::unmatched.eq(true))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Blocks ---

#[derive(Debug, Deserialize)]
pub struct AdminBlockRequest {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
}

/// POST /admin/blocks - create a block on behalf of a user; tombstones any
/// live match between the pair
pub async fn admin_block(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(req): Json<AdminBlockRequest>,
) -> AppResult<Json<ApiResponse<AdminActionResponse>>> {
    if req.blocker_id == req.blocked_id {
        return Err(AppError::new(ErrorCode::ValidationError, "blocker and blocked must differ"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let found: Vec<Uuid> = users::table
        .filter(users::id.eq_any(vec![req.blocker_id, req.blocked_id]))
        .select(users::id)
        .load(&mut conn)?;
    if found.len() != 2 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }

    audit::log_admin_action(
        &mut conn,
        admin.0.id,
        "block_user",
        Some(req.blocked_id),
        Some(serde_json::json!({ "blocker_id": req.blocker_id, "blocked_id": req.blocked_id })),
    )?;

    conn.transaction::<(), AppError, _>(|conn| {
        diesel::insert_into(blocks::table)
            .values(&NewBlock { blocker_id: req.blocker_id, blocked_id: req.blocked_id })
            .on_conflict((blocks::blocker_id, blocks::blocked_id))
            .do_nothing()
            .execute(conn)?;

        // Canonical pair key: smaller id first.
        let (user1_id, user2_id) = if req.blocker_id < req.blocked_id {
            (req.blocker_id, req.blocked_id)
        } else {
            (req.blocked_id, req.blocker_id)
        };
        diesel::update(
            matches::table
                .filter(matches::user1_id.eq(user1_id))
                .filter(matches::user2_id.eq(user2_id))
                .filter(matches::unmatched.eq(false)),
        )
        .set(matches::unmatched.eq(true))
        .execute(conn)?;

        Ok(())
    })?;

    Ok(Json(ApiResponse::ok(AdminActionResponse { success: true })))
}

// --- Reports ---

#[derive(Debug, Deserialize)]
pub struct ReportFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub resolved: Option<bool>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl ReportFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportAdminView {
    #[serde(flatten)]
    pub report: Report,
    pub reporter: Option<UserRef>,
    pub target: Option<UserRef>,
}

/// GET /admin/reports - paginated reports, optionally filtered by resolution
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ReportFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<ReportAdminView>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let (items, total): (Vec<Report>, i64) = if let Some(resolved) = params.resolved {
        let items = reports::table
            .filter(reports::resolved.eq(resolved))
            .order(reports::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load(&mut conn)?;
        let total = reports::table
            .filter(reports::resolved.eq(resolved))
            .count()
            .get_result(&mut conn)?;
        (items, total)
    } else {
        let items = reports::table
            .order(reports::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load(&mut conn)?;
        let total = reports::table.count().get_result(&mut conn)?;
        (items, total)
    };

    let mut ids: Vec<Uuid> = items.iter().flat_map(|r| [r.reporter_id, r.target_id]).collect();
    ids.sort();
    ids.dedup();
    let refs = user_refs(&mut conn, &ids)?;

    let views: Vec<ReportAdminView> = items
        .into_iter()
        .map(|r| ReportAdminView {
            reporter: refs.get(&r.reporter_id).cloned(),
            target: refs.get(&r.target_id).cloned(),
            report: r,
        })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(views, total as u64, &pagination))))
}

/// POST /admin/reports/:id/resolve
pub async fn resolve_report(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let report: Report = reports::table
        .find(report_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    if report.resolved {
        return Err(AppError::new(
            ErrorCode::ReportAlreadyResolved,
            "this report has already been resolved",
        ));
    }

    audit::log_admin_action(&mut conn, admin.0.id, "resolve_report", Some(report_id), None)?;

    let updated: Report = diesel::update(reports::table.find(report_id))
        .set(reports::resolved.eq(true))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Audit log ---

/// GET /admin/logs - the append-only audit trail, newest first
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminLog>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items: Vec<AdminLog> = admin_logs::table
        .order(admin_logs::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load(&mut conn)?;

    let total: i64 = admin_logs::table.count().get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}
