use axum::{routing::{delete, get, post}, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod matching;
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
    ember_shared::middleware::init_tracing("ember-matching");

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
        .route("/discover", get(routes::discover::discover))
        .route("/swipes/:direction", post(routes::swipes::record_swipe))
        .route("/swipes/undo/:target_id", delete(routes::swipes::undo_swipe))
        .route("/matches", get(routes::matches::list_matches))
        .route("/matches/unmatch", post(routes::matches::unmatch))
        .route("/blocks", post(routes::blocks::create_block))
        .route("/blocks/:blocked_id", delete(routes::blocks::remove_block))
        .layer(axum::middleware::from_fn(ember_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "ember-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
