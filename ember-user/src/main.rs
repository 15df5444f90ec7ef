use axum::{routing::{delete, get, post, put}, Router};
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
use ember_shared::clients::redis::RedisClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ember_shared::middleware::init_tracing("ember-user");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    let metrics_handle = ember_shared::middleware::init_metrics();

    let state = Arc::new(AppState { db, config, rabbitmq, redis });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(move || {
            let handle = metrics_handle.clone();
            async move { handle.render() }
        }))
        .route("/register", post(routes::register::register))
        .route("/me", get(routes::profile::get_profile).patch(routes::profile::update_profile))
        .route("/onboarding", post(routes::profile::complete_onboarding))
        .route("/users/:id", get(routes::users::get_user))
        .route("/photos", post(routes::photos::add_photo))
        .route("/photos/:id", delete(routes::photos::delete_photo))
        .route("/photos/:id/main", put(routes::photos::set_main_photo))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/presence", post(routes::internal::update_presence))
        .layer(axum::middleware::from_fn(ember_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "ember-user starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
