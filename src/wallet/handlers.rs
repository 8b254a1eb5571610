use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::validate,
    error::{ApiError, ApiJson, ApiResult},
    state::AppState,
    users::{UserStore, WalletCredit},
};

use super::dto::{parse_amount, AddCoinsRequest, WalletResponse};

pub fn wallet_routes() -> Router<AppState> {
    Router::new().route("/wallet/add", post(add_coins))
}

#[instrument(skip(state, payload))]
pub async fn add_coins(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddCoinsRequest>,
) -> ApiResult<Json<WalletResponse>> {
    let wallet = credit(state.users.as_ref(), payload).await?;
    Ok(Json(WalletResponse {
        success: true,
        wallet,
    }))
}

/// Credits the wallet in a single datastore statement and returns the new
/// balance.
pub async fn credit(users: &dyn UserStore, req: AddCoinsRequest) -> ApiResult<i64> {
    let phone = validate::phone(req.phone.as_deref(), "Phone required")?;
    let amount = parse_amount(req.amount.as_ref());
    if amount < 0 {
        warn!(%phone, amount, "negative wallet credit rejected");
        return Err(ApiError::validation("Amount must not be negative"));
    }

    let wallet = match users.add_to_wallet(&phone, amount).await? {
        WalletCredit::Credited(wallet) => wallet,
        WalletCredit::UnknownPhone => {
            warn!(%phone, "wallet credit for unknown phone");
            return Err(ApiError::NotFound);
        }
        WalletCredit::Overflow => {
            warn!(%phone, amount, "wallet credit would overflow balance");
            return Err(ApiError::validation("Amount too large"));
        }
    };

    info!(%phone, amount, wallet, "wallet credited");
    Ok(wallet)
}
