/// Join / hasJoined handshake
///
/// A client announces the server it is joining with `join`; the game server
/// then confirms it with `has_joined`. The pending join is a row in the
/// `sessions` table keyed by the profile it was made for.

use crate::{
    config::SessionConfig,
    db::{models::Session, unix_now},
    error::{YggError, YggResult},
    metrics,
    profile::{normalize_uuid, ProfileResolver, TexturedProfile},
    token::TokenStore,
};
use sqlx::SqlitePool;

/// Session handshake service
#[derive(Clone)]
pub struct SessionHandshake {
    db: SqlitePool,
    tokens: TokenStore,
    profiles: ProfileResolver,
    config: SessionConfig,
}

impl SessionHandshake {
    pub fn new(
        db: SqlitePool,
        tokens: TokenStore,
        profiles: ProfileResolver,
        config: SessionConfig,
    ) -> Self {
        Self {
            db,
            tokens,
            profiles,
            config,
        }
    }

    /// Record that the token's selected profile is joining `server_id`
    ///
    /// `profile_uuid` is the dashless form sent by the client and must name the
    /// selected profile. Any older pending join of that profile is replaced.
    pub async fn join(
        &self,
        access_token: &str,
        profile_uuid: &str,
        server_id: &str,
        client_ip: Option<&str>,
    ) -> YggResult<()> {
        let result = self
            .try_join(access_token, profile_uuid, server_id, client_ip)
            .await;
        metrics::record_handshake("join", result.is_ok());
        result
    }

    async fn try_join(
        &self,
        access_token: &str,
        profile_uuid: &str,
        server_id: &str,
        client_ip: Option<&str>,
    ) -> YggResult<()> {
        let account = self
            .tokens
            .resolve_account(access_token)
            .await?
            .ok_or_else(YggError::invalid_token)?;

        let profile = self
            .profiles
            .selected_profile(&account)
            .await?
            .ok_or_else(YggError::invalid_token)?;

        let requested = normalize_uuid(profile_uuid).map_err(|_| YggError::invalid_token())?;
        if requested != profile.uuid {
            tracing::debug!(account_id = account.id, "join for a profile other than the selected one");
            return Err(YggError::invalid_token());
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM sessions WHERE profile = ?1")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO sessions (profile, server_id, ip_addr, created) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(profile.id)
        .bind(server_id)
        .bind(client_ip.unwrap_or_default())
        .bind(unix_now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(profile = %profile.uuid, server_id, "profile joined server");

        Ok(())
    }

    /// Confirm that `username` joined `server_id` and consume the pending join
    ///
    /// When `expected_ip` is given the pending join must have come from it.
    pub async fn has_joined(
        &self,
        username: &str,
        server_id: &str,
        expected_ip: Option<&str>,
    ) -> YggResult<TexturedProfile> {
        let result = self.try_has_joined(username, server_id, expected_ip).await;
        metrics::record_handshake("has_joined", result.is_ok());
        result
    }

    async fn try_has_joined(
        &self,
        username: &str,
        server_id: &str,
        expected_ip: Option<&str>,
    ) -> YggResult<TexturedProfile> {
        let profile = self
            .profiles
            .profile_by_name(username)
            .await?
            .ok_or_else(|| YggError::not_found("Profile does not exist."))?;

        // Consuming is a single write statement, so no read lock is ever upgraded
        let consumed = sqlx::query_as::<_, Session>(
            "DELETE FROM sessions
             WHERE id = (
                 SELECT id FROM sessions
                 WHERE profile = ?1 AND server_id = ?2
                 ORDER BY id DESC LIMIT 1
             )
             AND (?3 IS NULL OR ip_addr = ?3)
             RETURNING id, profile, server_id, ip_addr, created",
        )
        .bind(profile.id)
        .bind(server_id)
        .bind(expected_ip)
        .fetch_optional(&self.db)
        .await?;

        if consumed.is_none() {
            let pending = match expected_ip {
                Some(_) => self.pending_join(profile.id, server_id).await?,
                None => false,
            };

            if !pending && self.config.require_join {
                return Err(YggError::not_found("Profile has not joined this server."));
            }
            if expected_ip.is_some() {
                return Err(YggError::Forbidden("IP address does not match.".to_string()));
            }
        }

        tracing::debug!(
            profile = %profile.uuid,
            server_id,
            consumed = consumed.is_some(),
            "confirmed join"
        );

        self.profiles.textured_profile(&profile).await
    }

    async fn pending_join(&self, profile_id: i64, server_id: &str) -> YggResult<bool> {
        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE profile = ?1 AND server_id = ?2",
        )
        .bind(profile_id)
        .bind(server_id)
        .fetch_one(&self.db)
        .await?;

        Ok(pending > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServerConfig,
        error::ErrorKind,
        profile::ProfilePrivileges,
        testing,
    };
    use std::sync::Arc;

    struct Fixture {
        handshake: SessionHandshake,
        db: SqlitePool,
        access: String,
        uuid: String,
    }

    async fn setup(require_join: bool) -> Fixture {
        let db = testing::memory_db().await;
        let mut config = ServerConfig::default();
        config.session.require_join = require_join;
        let config = Arc::new(config);

        let tokens = TokenStore::new(db.clone(), config.tokens);
        let profiles = ProfileResolver::new(db.clone(), config.clone());

        let owner = testing::insert_account(&db, "a@x.com").await;
        let profile = profiles
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();
        let access = tokens.issue(owner, "client").await.unwrap();

        Fixture {
            handshake: SessionHandshake::new(db.clone(), tokens, profiles, config.session),
            db,
            access,
            uuid: profile.uuid,
        }
    }

    async fn pending_joins(db: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_strict_has_joined_consumes_the_join() {
        let f = setup(true).await;
        let undashed = f.uuid.replace('-', "");

        f.handshake.join(&f.access, &undashed, "srv1", None).await.unwrap();
        assert_eq!(pending_joins(&f.db).await, 1);

        let profile = f.handshake.has_joined("Steve", "srv1", None).await.unwrap();
        assert_eq!(profile.id, undashed);
        assert_eq!(profile.textures().unwrap().profile_id, f.uuid);
        assert_eq!(pending_joins(&f.db).await, 0);

        let err = f.handshake.has_joined("Steve", "srv1", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(err.passthrough_allowed());
        assert_eq!(err.to_string(), "Profile has not joined this server.");
    }

    #[tokio::test]
    async fn test_strict_has_joined_requires_matching_server() {
        let f = setup(true).await;
        let undashed = f.uuid.replace('-', "");

        f.handshake.join(&f.access, &undashed, "srv1", None).await.unwrap();
        assert!(f.handshake.has_joined("Steve", "srv2", None).await.is_err());
        assert!(f.handshake.has_joined("Steve", "srv1", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_lenient_has_joined_repeats() {
        let f = setup(false).await;
        let undashed = f.uuid.replace('-', "");

        f.handshake.join(&f.access, &undashed, "srv1", None).await.unwrap();
        f.handshake.has_joined("Steve", "srv1", None).await.unwrap();
        let again = f.handshake.has_joined("Steve", "srv1", None).await.unwrap();
        assert_eq!(again.name, "Steve");
    }

    #[tokio::test]
    async fn test_join_replaces_older_pending_join() {
        let f = setup(true).await;
        let undashed = f.uuid.replace('-', "");

        f.handshake.join(&f.access, &undashed, "srv1", None).await.unwrap();
        f.handshake.join(&f.access, &undashed, "srv2", None).await.unwrap();
        assert_eq!(pending_joins(&f.db).await, 1);

        assert!(f.handshake.has_joined("Steve", "srv1", None).await.is_err());
        assert!(f.handshake.has_joined("Steve", "srv2", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_join_with_mismatched_profile_creates_nothing() {
        let f = setup(true).await;

        let err = f
            .handshake
            .join(&f.access, "00000000000000000000000000000000", "srv1", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "Invalid token.");

        let err = f
            .handshake
            .join(&f.access, "not-a-uuid", "srv1", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assert_eq!(pending_joins(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_join_with_unknown_token() {
        let f = setup(true).await;
        let undashed = f.uuid.replace('-', "");

        let err = f
            .handshake
            .join("nope", &undashed, "srv1", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(pending_joins(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_has_joined_checks_ip() {
        let f = setup(true).await;
        let undashed = f.uuid.replace('-', "");

        f.handshake
            .join(&f.access, &undashed, "srv1", Some("10.0.0.1"))
            .await
            .unwrap();

        let err = f
            .handshake
            .has_joined("Steve", "srv1", Some("10.0.0.2"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "IP address does not match.");

        // A rejected check leaves the join pending
        f.handshake
            .has_joined("Steve", "srv1", Some("10.0.0.1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_lenient_ip_check_without_join_fails() {
        let f = setup(false).await;

        let err = f
            .handshake
            .has_joined("Steve", "srv1", Some("10.0.0.1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_has_joined_unknown_profile() {
        let f = setup(false).await;

        let err = f.handshake.has_joined("Nobody", "srv1", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Profile does not exist.");
        assert!(err.passthrough_allowed());

        // Exact name match only
        assert!(f.handshake.has_joined("steve", "srv1", None).await.is_err());
    }
}
