/// Token store backed by the `tokens` table
///
/// Every multi-statement operation runs inside one transaction so that a sweep,
/// a lookup and any follow-up write are observed atomically by concurrent readers.

use crate::{
    config::TokenConfig,
    db::{
        models::{Account, Token},
        unix_now,
    },
    error::YggResult,
    metrics,
    token::{generate_token, Validation},
};
use sqlx::{SqliteConnection, SqlitePool};

/// Issues, validates and revokes access tokens
#[derive(Clone)]
pub struct TokenStore {
    db: SqlitePool,
    policy: TokenConfig,
}

impl TokenStore {
    /// Create a new token store
    pub fn new(db: SqlitePool, policy: TokenConfig) -> Self {
        Self { db, policy }
    }

    pub fn policy(&self) -> TokenConfig {
        self.policy
    }

    /// Issue a new access token for an account
    pub async fn issue(&self, account_id: i64, client_token: &str) -> YggResult<String> {
        let mut conn = self.db.acquire().await?;
        let token = Self::insert_token(&mut conn, account_id, client_token, unix_now(), self.policy.ttl)
            .await?;
        Ok(token.access)
    }

    /// Check an access token
    ///
    /// Expired tokens are swept first. With `allow_stale` the token only has to
    /// exist; otherwise it also has to be inside the freshness window.
    pub async fn validate(
        &self,
        access_token: &str,
        client_token: Option<&str>,
        allow_stale: bool,
    ) -> YggResult<bool> {
        let mut tx = self.db.begin().await?;
        let (outcome, _) = self
            .check(&mut tx, access_token, client_token, allow_stale, unix_now())
            .await?;
        tx.commit().await?;

        Ok(outcome == Validation::Valid)
    }

    /// Fetch a fresh token row
    pub async fn lookup(&self, access_token: &str) -> YggResult<Option<Token>> {
        let mut tx = self.db.begin().await?;
        let (_, token) = self
            .check(&mut tx, access_token, None, false, unix_now())
            .await?;
        tx.commit().await?;

        Ok(token)
    }

    /// Replace a token with a new one for the same account and client
    ///
    /// Stale tokens may be refreshed until their absolute expiry. The new row is
    /// inserted and the old one deleted in the same transaction.
    pub async fn refresh(&self, access_token: &str, client_token: &str) -> YggResult<Option<Token>> {
        let now = unix_now();
        let mut tx = self.db.begin().await?;

        let (_, old) = self
            .check(&mut tx, access_token, Some(client_token), true, now)
            .await?;
        let Some(old) = old else {
            // Keep the sweep
            tx.commit().await?;
            return Ok(None);
        };

        let new = Self::insert_token(&mut tx, old.account, &old.client, now, self.policy.ttl).await?;
        sqlx::query("DELETE FROM tokens WHERE id = ?1")
            .bind(old.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(account_id = old.account, "refreshed access token");

        Ok(Some(new))
    }

    /// Resolve the account owning a fresh access token
    pub async fn resolve_account(&self, access_token: &str) -> YggResult<Option<Account>> {
        let mut tx = self.db.begin().await?;
        let (_, token) = self
            .check(&mut tx, access_token, None, false, unix_now())
            .await?;

        let account = match token {
            Some(token) => {
                sqlx::query_as::<_, Account>(
                    "SELECT id, email, password_hash, language, country, selected_profile
                     FROM accounts WHERE id = ?1",
                )
                .bind(token.account)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => None,
        };

        tx.commit().await?;
        Ok(account)
    }

    /// Delete a token if the client token matches
    ///
    /// Returns whether a row was removed.
    pub async fn invalidate(&self, access_token: &str, client_token: &str) -> YggResult<bool> {
        let result = sqlx::query("DELETE FROM tokens WHERE access = ?1 AND client = ?2")
            .bind(access_token)
            .bind(client_token)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every token of an account
    pub async fn revoke_all(&self, account_id: i64) -> YggResult<u64> {
        let result = sqlx::query("DELETE FROM tokens WHERE account = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        let revoked = result.rows_affected();
        tracing::info!(account_id, revoked, "revoked all tokens for account");
        Ok(revoked)
    }

    /// Sweep expired rows, then classify the token
    async fn check(
        &self,
        conn: &mut SqliteConnection,
        access_token: &str,
        client_token: Option<&str>,
        allow_stale: bool,
        now: i64,
    ) -> YggResult<(Validation, Option<Token>)> {
        Self::sweep_expired(conn, now).await?;

        let token = sqlx::query_as::<_, Token>(
            "SELECT id, access, client, account, issued, expires FROM tokens WHERE access = ?1",
        )
        .bind(access_token)
        .fetch_optional(&mut *conn)
        .await?;

        let outcome = match &token {
            None => Validation::Unknown,
            Some(token) if client_token.is_some_and(|client| client != token.client) => {
                Validation::ClientMismatch
            }
            Some(token) if !allow_stale && now >= token.issued + self.policy.fresh_window => {
                Validation::Stale
            }
            Some(_) => Validation::Valid,
        };

        metrics::record_token_validation(outcome);
        if outcome != Validation::Valid {
            tracing::debug!(outcome = outcome.as_str(), "token rejected");
            return Ok((outcome, None));
        }

        Ok((outcome, token))
    }

    async fn sweep_expired(conn: &mut SqliteConnection, now: i64) -> YggResult<u64> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires <= ?1")
            .bind(now)
            .execute(&mut *conn)
            .await?;

        let swept = result.rows_affected();
        if swept > 0 {
            metrics::record_tokens_swept(swept);
            tracing::debug!(swept, "swept expired tokens");
        }
        Ok(swept)
    }

    async fn insert_token(
        conn: &mut SqliteConnection,
        account_id: i64,
        client_token: &str,
        now: i64,
        ttl: i64,
    ) -> YggResult<Token> {
        let access = generate_token();
        let expires = now + ttl;

        let id = sqlx::query(
            "INSERT INTO tokens (access, client, account, issued, expires)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&access)
        .bind(client_token)
        .bind(account_id)
        .bind(now)
        .bind(expires)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        metrics::record_token_issued();
        tracing::debug!(account_id, "issued access token");

        Ok(Token {
            id,
            access,
            client: client_token.to_string(),
            account: account_id,
            issued: now,
            expires,
        })
    }
}
