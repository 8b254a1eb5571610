use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginRequest, PublicUser, RequestOtpRequest, SignupRequest,
            VerifyOtpRequest,
        },
        notify::OtpNotifier,
        otp::{self, OtpRejection, OtpState},
        password::{hash_password, verify_password},
        validate,
    },
    config::OtpConfig,
    error::{ApiError, ApiResult, INVALID_CREDENTIALS, INVALID_OTP},
    users::{NewUser, User, UserStore},
};

/// Registers a phone with a password. Never touches an existing row.
pub async fn signup(users: &dyn UserStore, req: SignupRequest) -> ApiResult<()> {
    const MISSING: &str = "Phone & password required";
    let password = validate::secret(req.password.as_deref(), MISSING)?;
    let phone = validate::phone(req.phone.as_deref(), MISSING)?;
    let email = validate::present(req.email.as_deref());
    if let Some(email) = email {
        if !validate::is_valid_email(email) {
            warn!(%phone, "signup with invalid email");
            return Err(ApiError::validation("Invalid email"));
        }
    }

    if users.find_by_phone(&phone).await?.is_some() {
        warn!(%phone, "phone already registered");
        return Err(ApiError::Conflict);
    }

    let hash = hash_password(password)?;
    let inserted = users
        .insert(NewUser {
            phone: &phone,
            name: validate::present(req.name.as_deref()),
            email,
            password_hash: Some(&hash),
            wallet: 0,
        })
        .await?;
    if !inserted {
        warn!(%phone, "phone registered concurrently");
        return Err(ApiError::Conflict);
    }

    info!(%phone, "user signed up");
    Ok(())
}

/// Password login. Unknown phone, password-less user and wrong password
/// all fail with the same message.
pub async fn login(users: &dyn UserStore, req: LoginRequest) -> ApiResult<PublicUser> {
    const MISSING: &str = "Phone & password required";
    let password = validate::secret(req.password.as_deref(), MISSING)?;
    let phone = validate::phone(req.phone.as_deref(), MISSING)?;

    let Some(user) = users.find_by_phone(&phone).await? else {
        warn!(%phone, "login unknown phone");
        return Err(ApiError::Auth(INVALID_CREDENTIALS));
    };
    let Some(hash) = user.password_hash.as_deref() else {
        warn!(%phone, user_id = %user.id, "login on user without password");
        return Err(ApiError::Auth(INVALID_CREDENTIALS));
    };
    if !verify_password(password, hash)? {
        warn!(%phone, user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth(INVALID_CREDENTIALS));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user.into())
}

/// Issues a fresh code, provisioning a shell user for an unseen phone.
/// Returns the code only if the notifier echoes it.
pub async fn request_otp(
    users: &dyn UserStore,
    notifier: &dyn OtpNotifier,
    cfg: &OtpConfig,
    req: RequestOtpRequest,
    now: OffsetDateTime,
) -> ApiResult<Option<String>> {
    let phone = validate::phone(req.phone.as_deref(), "Phone required")?;

    let code = otp::generate_code(cfg.length);
    let expires = otp::expiry_from(now, cfg.ttl_minutes);
    let created = users.issue_otp(&phone, &code, expires).await?;
    if created {
        info!(%phone, "shell user created for otp");
    }
    debug!(%phone, %expires, "otp issued");

    Ok(notifier.deliver(&phone, &code).await?)
}

pub async fn verify_otp(
    users: &dyn UserStore,
    req: VerifyOtpRequest,
    now: OffsetDateTime,
) -> ApiResult<PublicUser> {
    const MISSING: &str = "Phone & OTP required";
    let phone = validate::phone(req.phone.as_deref(), MISSING)?;
    let submitted =
        validate::present(req.otp.as_deref()).ok_or_else(|| ApiError::validation(MISSING))?;

    let Some(user) = users.find_by_phone(&phone).await? else {
        warn!(%phone, "otp verify on unknown phone");
        return Err(ApiError::NotRequested);
    };
    redeem_otp(users, &user, submitted, now).await?;

    info!(user_id = %user.id, "otp verified");
    Ok(user.into())
}

/// Sets a new password for a known phone. With `requires_otp` the request
/// must also carry the pending code, which is consumed.
pub async fn reset_password(
    users: &dyn UserStore,
    req: ForgotPasswordRequest,
    requires_otp: bool,
    now: OffsetDateTime,
) -> ApiResult<()> {
    const MISSING: &str = "Phone & new password required";
    let new_password = validate::secret(req.new_password.as_deref(), MISSING)?;
    let phone = validate::phone(req.phone.as_deref(), MISSING)?;

    let Some(user) = users.find_by_phone(&phone).await? else {
        warn!(%phone, "password reset for unknown phone");
        return Err(ApiError::NotFound);
    };

    if requires_otp {
        let submitted = validate::present(req.otp.as_deref())
            .ok_or_else(|| ApiError::validation("OTP required"))?;
        redeem_otp(users, &user, submitted, now).await?;
    }

    let hash = hash_password(new_password)?;
    if !users.set_password(user.id, &hash).await? {
        return Err(ApiError::NotFound);
    }

    info!(user_id = %user.id, guarded = requires_otp, "password updated");
    Ok(())
}

/// Checks `submitted` against the user's pending code and clears it.
/// Losing a race to another verify or a newer request reads as
/// "not requested".
async fn redeem_otp(
    users: &dyn UserStore,
    user: &User,
    submitted: &str,
    now: OffsetDateTime,
) -> ApiResult<()> {
    match OtpState::of(user).check(submitted, now) {
        Ok(()) => {}
        Err(OtpRejection::NotRequested) => {
            warn!(user_id = %user.id, "otp verify without pending code");
            return Err(ApiError::NotRequested);
        }
        Err(OtpRejection::InvalidOrExpired) => {
            warn!(user_id = %user.id, "invalid or expired otp");
            return Err(ApiError::Auth(INVALID_OTP));
        }
    }

    if !users.consume_otp(user.id, submitted).await? {
        warn!(user_id = %user.id, "otp consumed concurrently");
        return Err(ApiError::NotRequested);
    }
    Ok(())
}
