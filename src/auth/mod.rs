use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod notify;
pub mod otp;
pub mod password;
pub mod services;
pub(crate) mod validate;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
