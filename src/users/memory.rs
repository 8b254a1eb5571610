use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User, WalletCredit};

/// In-process `UserStore` used by handler and router tests. Each method
/// holds the lock for its whole body, mirroring the single-statement
/// atomicity of the Postgres store.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn get(&self, phone: &str) -> Option<User> {
        self.rows.lock().unwrap().get(phone).cloned()
    }

    pub fn update(&self, phone: &str, f: impl FnOnce(&mut User)) {
        let mut rows = self.rows.lock().unwrap();
        f(rows.get_mut(phone).expect("user exists"));
    }
}

fn blank(phone: &str) -> User {
    User {
        id: Uuid::new_v4(),
        phone: phone.to_string(),
        name: None,
        email: None,
        password_hash: None,
        wallet: 0,
        otp_code: None,
        otp_expires: None,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_phone(&self, phone: &str) -> anyhow::Result<Option<User>> {
        Ok(self.get(phone))
    }

    async fn insert(&self, user: NewUser<'_>) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(user.phone) {
            return Ok(false);
        }
        let row = User {
            name: user.name.map(str::to_string),
            email: user.email.map(str::to_string),
            password_hash: user.password_hash.map(str::to_string),
            wallet: user.wallet,
            ..blank(user.phone)
        };
        rows.insert(user.phone.to_string(), row);
        Ok(true)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.values_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = Some(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn issue_otp(
        &self,
        phone: &str,
        code: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let created = !rows.contains_key(phone);
        let user = rows.entry(phone.to_string()).or_insert_with(|| blank(phone));
        user.otp_code = Some(code.to_string());
        user.otp_expires = Some(expires);
        Ok(created)
    }

    async fn consume_otp(&self, id: Uuid, code: &str) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .values_mut()
            .find(|u| u.id == id && u.otp_code.as_deref() == Some(code))
        {
            Some(user) => {
                user.otp_code = None;
                user.otp_expires = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_to_wallet(&self, phone: &str, amount: i64) -> anyhow::Result<WalletCredit> {
        let mut rows = self.rows.lock().unwrap();
        let Some(user) = rows.get_mut(phone) else {
            return Ok(WalletCredit::UnknownPhone);
        };
        Ok(match user.wallet.checked_add(amount) {
            Some(wallet) => {
                user.wallet = wallet;
                WalletCredit::Credited(wallet)
            }
            None => WalletCredit::Overflow,
        })
    }
}
