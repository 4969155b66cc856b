//! Account Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{AccountRole, Timestamp};
use surrealdb::RecordId;

/// Account ID type
pub type AccountId = RecordId;

/// Account entity: customer, restaurant staff or delivery contractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AccountId>,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub role: AccountRole,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// Unix milliseconds
    pub date_joined: Timestamp,
}

fn default_true() -> bool {
    true
}

/// Public view of an account (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: AccountRole,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            role: account.role.clone(),
        }
    }
}

impl Account {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = Account::hash_password("hunter2!").unwrap();
        let account = Account {
            id: None,
            email: "a@example.com".into(),
            display_name: "A".into(),
            hash_pass: hash,
            role: AccountRole::Customer,
            is_active: true,
            date_joined: 0,
        };
        assert!(account.verify_password("hunter2!").unwrap());
        assert!(!account.verify_password("wrong").unwrap());
    }
}
