//! Demo fixtures. Not meant to be mounted in production.

pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::dev_routes()
}
