use axum::{extract::State, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginRequest, MessageResponse, OtpIssuedResponse,
            RequestOtpRequest, SignupRequest, SuccessResponse, UserResponse, VerifyOtpRequest,
        },
        services,
    },
    error::{ApiJson, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/request-otp", post(request_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/forgot-password", post(forgot_password))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    services::signup(state.users.as_ref(), payload).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = services::login(state.users.as_ref(), payload).await?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn request_otp(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RequestOtpRequest>,
) -> ApiResult<Json<OtpIssuedResponse>> {
    let otp = services::request_otp(
        state.users.as_ref(),
        state.notifier.as_ref(),
        &state.config.otp,
        payload,
        OffsetDateTime::now_utc(),
    )
    .await?;

    let message = if otp.is_some() {
        "OTP generated (demo returns OTP)."
    } else {
        "OTP sent"
    };
    Ok(Json(OtpIssuedResponse {
        success: true,
        otp,
        message,
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VerifyOtpRequest>,
) -> ApiResult<Json<UserResponse>> {
    let now = OffsetDateTime::now_utc();
    let user = services::verify_otp(state.users.as_ref(), payload, now).await?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    services::reset_password(
        state.users.as_ref(),
        payload,
        state.config.reset_requires_otp,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated",
    }))
}
