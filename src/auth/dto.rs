use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::User;

/// Request body for signup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    #[serde(deserialize_with = "crate::auth::validate::phone_field")]
    pub phone: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Request body for password login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(deserialize_with = "crate::auth::validate::phone_field")]
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestOtpRequest {
    #[serde(deserialize_with = "crate::auth::validate::phone_field")]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    #[serde(deserialize_with = "crate::auth::validate::phone_field")]
    pub phone: Option<String>,
    pub otp: Option<String>,
}

/// Request body for password reset. `otp` is only consulted when resets
/// are guarded.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(deserialize_with = "crate::auth::validate::phone_field")]
    pub phone: Option<String>,
    pub new_password: Option<String>,
    pub otp: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub wallet: i64,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            phone: u.phone,
            name: u.name,
            wallet: u.wallet,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct OtpIssuedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}
