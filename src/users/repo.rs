use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, WalletCredit};

/// Access to the `users` table. Every method is a single statement.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> anyhow::Result<Option<User>>;

    /// Inserts a row unless the phone is taken. Returns `false` on conflict;
    /// an existing row is never touched.
    async fn insert(&self, user: NewUser<'_>) -> anyhow::Result<bool>;

    /// Replaces the password hash. Returns `false` if no row matched.
    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;

    /// Stores a fresh OTP, creating a shell user for an unseen phone.
    /// Returns `true` when the row was created.
    async fn issue_otp(
        &self,
        phone: &str,
        code: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<bool>;

    /// Clears the OTP fields only while they still hold `code`.
    async fn consume_otp(&self, id: Uuid, code: &str) -> anyhow::Result<bool>;

    /// Adds `amount` to the balance in place. A credit that would overflow
    /// the balance leaves the row untouched.
    async fn add_to_wallet(&self, phone: &str, amount: i64) -> anyhow::Result<WalletCredit>;
}

/// SQLSTATE raised when `wallet + $1` leaves the BIGINT range.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_phone(&self, phone: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, phone, name, email, password_hash, wallet, otp_code, otp_expires, created_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.db)
        .await
        .context("find user by phone")?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser<'_>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (phone, name, email, password_hash, wallet)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (phone) DO NOTHING
            "#,
        )
        .bind(user.phone)
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.wallet)
        .execute(&self.db)
        .await
        .context("insert user")?;
        Ok(res.rows_affected() == 1)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.db)
            .await
            .context("update password hash")?;
        Ok(res.rows_affected() == 1)
    }

    async fn issue_otp(
        &self,
        phone: &str,
        code: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        // xmax is 0 only for a freshly inserted tuple
        let created = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO users (phone, otp_code, otp_expires)
            VALUES ($1, $2, $3)
            ON CONFLICT (phone)
            DO UPDATE SET otp_code = EXCLUDED.otp_code, otp_expires = EXCLUDED.otp_expires
            RETURNING (xmax = 0)
            "#,
        )
        .bind(phone)
        .bind(code)
        .bind(expires)
        .fetch_one(&self.db)
        .await
        .context("store otp")?;
        Ok(created)
    }

    async fn consume_otp(&self, id: Uuid, code: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET otp_code = NULL, otp_expires = NULL
             WHERE id = $1 AND otp_code = $2
            "#,
        )
        .bind(id)
        .bind(code)
        .execute(&self.db)
        .await
        .context("clear otp")?;
        Ok(res.rows_affected() == 1)
    }

    async fn add_to_wallet(&self, phone: &str, amount: i64) -> anyhow::Result<WalletCredit> {
        let res = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET wallet = wallet + $1 WHERE phone = $2 RETURNING wallet",
        )
        .bind(amount)
        .bind(phone)
        .fetch_optional(&self.db)
        .await;

        match res {
            Ok(Some(wallet)) => Ok(WalletCredit::Credited(wallet)),
            Ok(None) => Ok(WalletCredit::UnknownPhone),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
                Ok(WalletCredit::Overflow)
            }
            Err(e) => Err(e).context("increment wallet"),
        }
    }
}
