/// Account manager implementation using runtime queries

use crate::{
    config::AuthConfig,
    db::models::Account,
    error::{YggError, YggResult},
};
use sqlx::SqlitePool;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, language, country, selected_profile";

/// Account manager service
#[derive(Clone)]
pub struct AccountManager {
    db: SqlitePool,
    config: AuthConfig,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create a new account
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        language: &str,
        country: &str,
    ) -> YggResult<Account> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(YggError::bad_request("Email and password are required"));
        }

        if self.get_account_by_email(email).await?.is_some() {
            return Err(YggError::bad_request("Email already registered"));
        }

        let password_hash = self.hash_password(password).await?;

        let id = sqlx::query(
            "INSERT INTO accounts (email, password_hash, language, country)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(email)
        .bind(&password_hash)
        .bind(language)
        .bind(country)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        tracing::info!(account_id = id, "created account");

        Ok(Account {
            id,
            email: email.to_string(),
            password_hash,
            language: language.to_string(),
            country: country.to_string(),
            selected_profile: None,
        })
    }

    /// Change the password of an account
    pub async fn update_password(&self, account_id: i64, new_password: &str) -> YggResult<()> {
        if new_password.is_empty() {
            return Err(YggError::bad_request("Password cannot be empty"));
        }

        let password_hash = self.hash_password(new_password).await?;
        let result = sqlx::query("UPDATE accounts SET password_hash = ?1 WHERE id = ?2")
            .bind(&password_hash)
            .bind(account_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(YggError::bad_request("Account does not exist."));
        }

        tracing::info!(account_id, "updated account password");
        Ok(())
    }

    /// Get account by id
    pub async fn get_account(&self, account_id: i64) -> YggResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    /// Get account by email
    pub async fn get_account_by_email(&self, email: &str) -> YggResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE email = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    /// Check an email/password pair
    ///
    /// Unknown accounts and wrong passwords fail the same way.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> YggResult<Account> {
        let account = self
            .get_account_by_email(email)
            .await?
            .ok_or_else(YggError::invalid_credentials)?;

        let hash = account.password_hash.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| YggError::Internal(format!("Password verification task failed: {}", e)))??;

        if !valid {
            tracing::debug!(account_id = account.id, "password mismatch");
            return Err(YggError::invalid_credentials());
        }

        Ok(account)
    }

    async fn hash_password(&self, password: &str) -> YggResult<String> {
        let password = password.to_string();
        let cost = self.config.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| YggError::Internal(format!("Password hashing task failed: {}", e)))??;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{account::UserObject, error::ErrorKind, testing};

    async fn setup() -> AccountManager {
        let db = testing::memory_db().await;
        AccountManager::new(db, AuthConfig { bcrypt_cost: 4 })
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let manager = setup().await;
        let account = manager
            .create_account("a@x.com", "hunter2", "en-us", "US")
            .await
            .unwrap();
        assert_ne!(account.password_hash, "hunter2");

        let verified = manager.verify_credentials("a@x.com", "hunter2").await.unwrap();
        assert_eq!(verified.id, account.id);
        assert_eq!(verified.selected_profile, None);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_forbidden() {
        let manager = setup().await;
        manager
            .create_account("a@x.com", "hunter2", "en-us", "US")
            .await
            .unwrap();

        let wrong = manager.verify_credentials("a@x.com", "hunter3").await.unwrap_err();
        assert_eq!(wrong.kind(), ErrorKind::Forbidden);

        let unknown = manager.verify_credentials("b@x.com", "hunter2").await.unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::Forbidden);
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let manager = setup().await;
        manager
            .create_account("a@x.com", "pw", "en-us", "US")
            .await
            .unwrap();

        let err = manager
            .create_account("a@x.com", "pw2", "en-us", "US")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_update_password() {
        let manager = setup().await;
        let account = manager
            .create_account("a@x.com", "old", "en-us", "US")
            .await
            .unwrap();

        manager.update_password(account.id, "new").await.unwrap();
        assert!(manager.verify_credentials("a@x.com", "old").await.is_err());
        assert!(manager.verify_credentials("a@x.com", "new").await.is_ok());

        assert!(manager.update_password(999, "new").await.is_err());
    }

    #[tokio::test]
    async fn test_user_object() {
        let manager = setup().await;
        let account = manager
            .create_account("a@x.com", "pw", "en-gb", "GB")
            .await
            .unwrap();

        let user = serde_json::to_value(UserObject::from(&account)).unwrap();
        assert_eq!(user["username"], "a@x.com");
        assert_eq!(user["id"], account.id.to_string());
        assert_eq!(user["properties"][0]["name"], "preferredLanguage");
        assert_eq!(user["properties"][0]["value"], "en-gb");
        assert_eq!(user["properties"][1]["name"], "registrationCountry");
        assert_eq!(user["properties"][1]["value"], "GB");
    }
}
