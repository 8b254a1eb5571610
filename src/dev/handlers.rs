use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    auth::password::hash_password,
    error::ApiResult,
    state::AppState,
    users::{NewUser, UserStore},
};

pub const SEED_PHONE: &str = "9999999999";
pub const SEED_NAME: &str = "Demo User";
pub const SEED_PASSWORD: &str = "123456";
pub const SEED_WALLET: i64 = 500;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub phone: &'static str,
    pub password: &'static str,
}

pub fn dev_routes() -> Router<AppState> {
    Router::new().route("/dev-seed", post(dev_seed))
}

#[instrument(skip(state))]
pub async fn dev_seed(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    seed_demo_user(state.users.as_ref()).await?;
    Ok(Json(SeedResponse {
        success: true,
        phone: SEED_PHONE,
        password: SEED_PASSWORD,
    }))
}

/// Creates the demo account if it is missing. Idempotent.
pub async fn seed_demo_user(users: &dyn UserStore) -> anyhow::Result<bool> {
    if users.find_by_phone(SEED_PHONE).await?.is_some() {
        return Ok(false);
    }
    let hash = hash_password(SEED_PASSWORD)?;
    let created = users
        .insert(NewUser {
            phone: SEED_PHONE,
            name: Some(SEED_NAME),
            email: None,
            password_hash: Some(&hash),
            wallet: SEED_WALLET,
        })
        .await?;
    if created {
        info!(phone = SEED_PHONE, "demo user seeded");
    }
    Ok(created)
}
