use std::time::Duration;

use anyhow::{bail, Context};

use crate::auth::otp;

/// How issued OTP codes reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpDelivery {
    /// Demo mode: the code is returned in the HTTP response.
    Echo,
    /// Code is handed to the out-of-band channel and never returned.
    Log,
}

#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub length: usize,
    pub ttl_minutes: i64,
    pub delivery: OtpDelivery,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub otp: OtpConfig,
    pub reset_requires_otp: bool,
    pub dev_seed_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;

        let length = parse_or(&get, "OTP_LENGTH", otp::DEFAULT_LENGTH)?;
        if !(1..=12).contains(&length) {
            bail!("OTP_LENGTH must be between 1 and 12, got {length}");
        }
        let ttl_minutes = parse_or(&get, "OTP_TTL_MINUTES", 5i64)?;
        if ttl_minutes <= 0 {
            bail!("OTP_TTL_MINUTES must be positive, got {ttl_minutes}");
        }
        let delivery = match get("OTP_DELIVERY").as_deref().map(str::trim) {
            None | Some("") | Some("echo") => OtpDelivery::Echo,
            Some("log") => OtpDelivery::Log,
            Some(other) => bail!("OTP_DELIVERY must be `echo` or `log`, got `{other}`"),
        };
        let acquire_secs = parse_or(&get, "DB_ACQUIRE_TIMEOUT_SECS", 5u64)?;

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10u32)?,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
            otp: OtpConfig {
                length,
                ttl_minutes,
                delivery,
            },
            reset_requires_otp: parse_or(&get, "RESET_REQUIRES_OTP", false)?,
            dev_seed_enabled: parse_or(&get, "DEV_SEED_ENABLED", true)?,
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        _ => Ok(default),
    }
}
