use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use ember_shared::clients::db::{create_pool, DbPool};
use ember_shared::clients::rabbitmq::RabbitMQClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ember_shared::middleware::init_tracing("ember-moderation");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let metrics_handle = ember_shared::middleware::init_metrics();

    let state = Arc::new(AppState { db, config, rabbitmq });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(move || {
            let handle = metrics_handle.clone();
            async move { handle.render() }
        }))
        .route("/reports", post(routes::user_routes::create_report))
        .route("/admin/users", get(routes::admin_routes::list_users))
        .route("/admin/users/:id", get(routes::admin_routes::get_user)
            .delete(routes::admin_routes::delete_user))
        .route("/admin/swipes", get(routes::admin_routes::list_swipes))
        .route("/admin/matches", get(routes::admin_routes::list_matches))
        .route("/admin/matches/:id/unmatch", post(routes::admin_routes::force_unmatch))
        .route("/admin/blocks", post(routes::admin_routes::admin_block))
        .route("/admin/reports", get(routes::admin_routes::list_reports))
        .route("/admin/reports/:id/resolve", post(routes::admin_routes::resolve_report))
        .route("/admin/logs", get(routes::admin_routes::list_logs))
        .layer(axum::middleware::from_fn(ember_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "ember-moderation starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
