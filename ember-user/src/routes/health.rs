use axum::Json;
use ember_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("ember-user", env!("CARGO_PKG_VERSION")))
}
