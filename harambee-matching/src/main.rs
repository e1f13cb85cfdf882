use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod matching;
mod models;
mod routes;
mod schema;
mod services;
mod store;

use config::AppConfig;
use harambee_shared::clients::db::{self, DbPool};
use harambee_shared::clients::rabbitmq::RabbitMQClient;
use harambee_shared::config::AuthConfig;
use harambee_shared::middleware::{AuthState, init_metrics, metrics_middleware, render_metrics};
use store::{MatchStore, PgMatchStore};

pub struct AppState {
    pub db: DbPool,
    pub store: Arc<dyn MatchStore>,
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
    harambee_shared::middleware::init_tracing("harambee-matching");

    let config = AppConfig::load()?;
    let jwt_secret = AuthConfig::load()?.jwt_secret()?;
    let port = config.port;
    let metrics = init_metrics()?;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState {
        store: Arc::new(PgMatchStore::new(db.clone())),
        db,
        config,
        rabbitmq,
        jwt_secret,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/discover", get(routes::discover::discover))
        .route("/suggestions", get(routes::discover::suggestions))
        .route("/actions", post(routes::actions::record_action))
        .route("/matches", get(routes::matches::list_matches))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
        .with_state(state)
        .merge(Router::new().route("/metrics", get(render_metrics)).with_state(metrics));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "harambee-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
