//! Shared building blocks for the Harambee services: error taxonomy, API
//! envelopes, bearer-token extraction, observability setup and the clients for
//! the hosted collaborators (Postgres, MinIO, RabbitMQ, Redis).

pub mod types;
pub mod errors;
pub mod middleware;
pub mod clients;
pub mod config;

pub use types::*;
pub use errors::{AppError, ErrorCode, AppResult};
