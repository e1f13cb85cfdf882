use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use harambee_shared::clients::db::{self, DbPool};
use harambee_shared::clients::minio::MinioClient;
use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::config::AuthConfig;
use harambee_shared::middleware::{AuthState, init_metrics, metrics_middleware, render_metrics};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub minio: MinioClient,
    pub jwt_secret: String,
}

impl AuthState for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

/// Multipart framing on top of the photo itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    harambee_shared::middleware::init_tracing("harambee-user");

    let config = AppConfig::load()?;
    let jwt_secret = AuthConfig::load()?.jwt_secret()?;
    let port = config.port;
    let body_limit = config.max_photo_bytes + UPLOAD_OVERHEAD_BYTES;
    let metrics = init_metrics()?;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let minio = MinioClient::new(
        &config.minio_endpoint,
        &config.minio_access_key,
        &config.minio_secret_key,
        &config.minio_bucket,
        &config.minio_public_url,
    )
    .await;

    let state = Arc::new(AppState { db, config, rabbitmq, minio, jwt_secret });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/me",
            get(routes::profile::get_profile)
                .patch(routes::profile::update_profile)
                .delete(routes::profile::deactivate_profile),
        )
        .route("/me/cultural-background", put(routes::background::put_cultural_background))
        .route("/me/personality", put(routes::background::put_personality))
        .route("/me/preferences", put(routes::background::put_preferences))
        .route("/profiles/:id", get(routes::profile::get_public_profile))
        .route(
            "/photos",
            axum::routing::post(routes::photo::upload_photo).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/photos/:id", delete(routes::photo::delete_photo))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
        .with_state(state)
        .merge(Router::new().route("/metrics", get(render_metrics)).with_state(metrics));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "harambee-user starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
