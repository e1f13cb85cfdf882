use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::{middleware, Router};
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
use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::config::AuthConfig;
use harambee_shared::middleware::{AuthState, init_metrics, metrics_middleware, render_metrics};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub jwt_secret: String,
}

impl AuthState for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    harambee_shared::middleware::init_tracing("harambee-community");

    let config = AppConfig::load()?;
    let jwt_secret = AuthConfig::load()?.jwt_secret()?;
    let port = config.port;
    let metrics = init_metrics()?;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq, jwt_secret });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Endorsements
        .route("/endorsements", post(routes::endorsements::create_endorsement))
        .route("/profiles/:id/endorsements", get(routes::endorsements::list_endorsements))
        // Verification quiz
        .route("/quiz/questions", get(routes::quiz::get_questions))
        .route("/quiz/submit", post(routes::quiz::submit_quiz))
        // Events
        .route("/events", get(routes::events::list_events).post(routes::events::create_event))
        .route("/events/:id/rsvp", post(routes::events::rsvp))
        .route("/events/:id/attendees", get(routes::events::list_attendees))
        // Admin
        .route("/admin/stats", get(routes::admin::get_stats))
        .route("/admin/users/:id/status", patch(routes::admin::update_user_status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
        .with_state(state)
        .merge(Router::new().route("/metrics", get(render_metrics)).with_state(metrics));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "harambee-community starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
