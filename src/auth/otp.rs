//! One-time codes: generation, expiry and the per-user pending state.

use rand::{rngs::OsRng, Rng};
use time::{Duration, OffsetDateTime};

use crate::users::User;

pub const DEFAULT_LENGTH: usize = 6;

/// Numeric code of `length` digits, each drawn independently from the OS CSPRNG.
pub fn generate_code(length: usize) -> String {
    (0..length)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}

pub fn expiry_from(issued_at: OffsetDateTime, ttl_minutes: i64) -> OffsetDateTime {
    issued_at + Duration::minutes(ttl_minutes)
}

/// Why a submitted code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    NotRequested,
    InvalidOrExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpState {
    NoOtp,
    Pending {
        code: String,
        expires: OffsetDateTime,
    },
}

impl OtpState {
    pub fn of(user: &User) -> Self {
        match (&user.otp_code, user.otp_expires) {
            (Some(code), Some(expires)) => Self::Pending {
                code: code.clone(),
                expires,
            },
            // a code without a deadline can never be valid
            (Some(code), None) => Self::Pending {
                code: code.clone(),
                expires: OffsetDateTime::UNIX_EPOCH,
            },
            (None, _) => Self::NoOtp,
        }
    }

    /// Mismatch and expiry are deliberately reported the same way.
    pub fn check(&self, submitted: &str, now: OffsetDateTime) -> Result<(), OtpRejection> {
        match self {
            Self::NoOtp => Err(OtpRejection::NotRequested),
            Self::Pending { code, expires } => {
                if code != submitted || now >= *expires {
                    Err(OtpRejection::InvalidOrExpired)
                } else {
                    Ok(())
                }
            }
        }
    }
}
