use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>, // Argon2 hash
    pub wallet: i64,
    pub otp_code: Option<String>,
    pub otp_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Fields supplied when inserting a row.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub phone: &'a str,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub wallet: i64,
}

/// Outcome of a wallet credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletCredit {
    /// New balance after the credit.
    Credited(i64),
    UnknownPhone,
    /// The new balance would not fit in a BIGINT; nothing was written.
    Overflow,
}
