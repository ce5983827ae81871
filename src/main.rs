//! # Study-Room Server
//!
//! REST backend for a study-room collaboration app: users register and log
//! in, create and join rooms, and post notes tied to a room.
//!
//! ## Architecture
//! - `config`: environment variable configuration
//! - `auth`: JWT issuance/validation, password hashing, auth middleware
//! - `database`: connection pool, entity models, embedded migrations
//! - `repository`: per-entity data access over raw SQL
//! - `routes`: HTTP handlers organized by API domain
//! - `server`: router wiring and startup
//!
//! ## Running
//! Set `JWT_SECRET` and either `DATABASE_URL` or the `DB_*` components,
//! then `cargo run`. The server listens on `0.0.0.0:$PORT` (default 3000).

mod auth;
mod config;
mod database;
mod error;
mod repository;
mod routes;
mod server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = server::start().await {
        tracing::error!("server error: {:#}", e);
        std::process::exit(1);
    }
}
