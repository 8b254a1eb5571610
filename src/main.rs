use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

mod app;
mod auth;
mod config;
mod dev;
mod error;
mod state;
mod users;
mod wallet;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "games11_auth=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    if config.dev_seed_enabled {
        tracing::warn!("dev seed endpoint enabled; disable DEV_SEED_ENABLED in production");
    }
    if !config.reset_requires_otp {
        tracing::warn!(
            "password reset is not gated by OTP; set RESET_REQUIRES_OTP=true in production"
        );
    }

    let app = app::build_app(AppState::init(db.clone(), config));
    let served = app::serve(app).await;

    db.close().await;
    tracing::info!("database pool closed");
    served
}
