use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use ember_shared::errors::AppResult;

use crate::models::NewAdminLog;
use crate::schema::admin_logs;

/// Append an admin action to the audit trail. Logged before the business
/// mutation runs and never rolled back afterwards.
pub fn log_admin_action(
    conn: &mut PgConnection,
    admin_id: Uuid,
    action: &str,
    target_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) -> AppResult<()> {
    diesel::insert_into(admin_logs::table)
        .values(&NewAdminLog {
            admin_id,
            action: action.to_string(),
            target_id,
            details,
        })
        .execute(conn)?;

    tracing::info!(admin_id = %admin_id, action = %action, "admin action logged");
    Ok(())
}
