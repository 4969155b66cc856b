//! Account Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::Account;
use shared::AccountRole;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct AccountRepository {
    base: BaseRepository,
}

impl AccountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find account by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Account>> {
        let thing = parse_record_id(id)?;
        let account: Option<Account> = self.base.db().select(thing).await?;
        Ok(account)
    }

    /// Find account by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM account WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let accounts: Vec<Account> = result.take(0)?;
        Ok(accounts.into_iter().next())
    }

    /// Create a new account. Email is unique.
    pub async fn create(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        role: AccountRole,
    ) -> RepoResult<Account> {
        if self.find_by_email(email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let hash_pass = Account::hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        // hash_pass is skip_serializing on the model, so persist with an
        // explicit query instead of .content()
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE account SET
                    email = $email,
                    display_name = $display_name,
                    hash_pass = $hash_pass,
                    role = $role,
                    is_active = true,
                    date_joined = $date_joined
                RETURN AFTER"#,
            )
            .bind(("email", email.to_string()))
            .bind(("display_name", display_name.to_string()))
            .bind(("hash_pass", hash_pass))
            .bind(("role", role))
            .bind(("date_joined", crate::utils::time::now_millis()))
            .await?;

        let created: Option<Account> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create account".to_string()))
    }

    /// Remove an account record, used to back out a partial registration
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = parse_record_id(id)?;
        let _: Option<Account> = self.base.db().delete(thing).await?;
        Ok(())
    }

    /// Replace the stored role, used when a staff account gains its restaurant
    pub async fn set_role(&self, id: &str, role: AccountRole) -> RepoResult<Account> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $account SET role = $role RETURN AFTER")
            .bind(("account", thing))
            .bind(("role", role))
            .await?;
        let accounts: Vec<Account> = result.take(0)?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Account not found: {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> AccountRepository {
        let db = DbService::new_in_memory().await.unwrap().db;
        AccountRepository::new(db)
    }

    #[tokio::test]
    async fn created_account_keeps_its_password_hash() {
        let accounts = repo().await;
        let created = accounts
            .create("a@example.com", "Alice", "hunter2!", AccountRole::Customer)
            .await
            .unwrap();
        assert!(created.id.is_some());
        assert!(created.verify_password("hunter2!").unwrap());

        // Round trip through a fresh read, not just the RETURN AFTER row
        let loaded = accounts
            .find_by_email("a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(loaded.verify_password("hunter2!").unwrap());
        assert!(!loaded.verify_password("wrong").unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let accounts = repo().await;
        accounts
            .create("a@example.com", "Alice", "hunter2!", AccountRole::Customer)
            .await
            .unwrap();
        let err = accounts
            .create("a@example.com", "Imposter", "other", AccountRole::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
