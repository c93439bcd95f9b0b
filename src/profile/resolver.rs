/// Profile resolver
///
/// Resolves accounts to profiles and builds the simple, full and textured
/// representations. Also owns skin variant and cape state.

use crate::{
    account::Property,
    config::ServerConfig,
    db::{
        models::{Account, Cape, Profile, SkinVariant},
        unix_now,
    },
    error::{YggError, YggResult},
    profile::views::{
        CapeView, FullProfile, SimpleProfile, SkinView, TextureMap, TextureState, TextureUrl,
        TexturedProfile, TexturesPayload, TEXTURES_PROPERTY,
    },
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

macro_rules! select_profile {
    ($condition:literal) => {
        concat!(
            "SELECT id, uuid, created, owner, name, name_history, skin_variant, capes, active_cape, attributes ",
            "FROM profiles WHERE ",
            $condition
        )
    };
}

const LOOKUP_BATCH: usize = 500;

/// Privilege flags a new profile starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfilePrivileges {
    pub chat: bool,
    pub multiplayer: bool,
    pub realms: bool,
    pub profanity_filter: bool,
}

impl Default for ProfilePrivileges {
    fn default() -> Self {
        Self {
            chat: true,
            multiplayer: true,
            realms: true,
            profanity_filter: false,
        }
    }
}

impl ProfilePrivileges {
    fn to_attributes(self) -> serde_json::Value {
        json!({
            "privileges": {
                "onlineChat": { "enabled": self.chat },
                "multiplayerServer": { "enabled": self.multiplayer },
                "multiplayerRealms": { "enabled": self.realms },
                "telemetry": { "enabled": false }
            },
            "profanityFilterPreferences": {
                "profanityFilterOn": self.profanity_filter
            }
        })
    }
}

/// Profile resolver service
#[derive(Clone)]
pub struct ProfileResolver {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl ProfileResolver {
    /// Create a new profile resolver
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Create a profile for an account
    ///
    /// The first profile of an account becomes its selected profile.
    pub async fn create_profile(
        &self,
        name: &str,
        owner: i64,
        privileges: ProfilePrivileges,
    ) -> YggResult<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(YggError::bad_request("Profile name cannot be empty"));
        }

        let uuid = Uuid::new_v4().hyphenated().to_string();
        let created = unix_now();
        let attributes = privileges.to_attributes().to_string();

        let mut tx = self.db.begin().await?;

        // The insert comes first so the transaction holds the write lock before it reads
        let inserted = sqlx::query(
            "INSERT INTO profiles (uuid, created, owner, name, name_history, skin_variant, attributes)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7
             WHERE EXISTS (SELECT 1 FROM accounts WHERE id = ?3)
               AND NOT EXISTS (SELECT 1 FROM profiles WHERE name = ?4 COLLATE NOCASE)",
        )
        .bind(&uuid)
        .bind(created)
        .bind(owner)
        .bind(name)
        .bind(name)
        .bind(SkinVariant::None.as_str())
        .bind(&attributes)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            let owner_exists: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE id = ?1")
                    .bind(owner)
                    .fetch_one(&mut *tx)
                    .await?;
            if owner_exists == 0 {
                return Err(YggError::bad_request("Account does not exist."));
            }
            return Err(YggError::bad_request("Profile name already taken."));
        }
        let id = inserted.last_insert_rowid();

        let selected = sqlx::query(
            "UPDATE accounts SET selected_profile = ?1 WHERE id = ?2 AND selected_profile IS NULL",
        )
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        tracing::info!(profile = %uuid, owner, selected = selected > 0, "created profile");

        Ok(Profile {
            id,
            uuid,
            created,
            owner,
            name: name.to_string(),
            name_history: name.to_string(),
            skin_variant: SkinVariant::None.as_str().to_string(),
            capes: None,
            active_cape: None,
            attributes,
        })
    }

    /// Get profile by primary key
    pub async fn get_profile(&self, id: i64) -> YggResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(select_profile!("id = ?1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(profile)
    }

    /// Get profile by hyphenated UUID
    pub async fn profile_by_uuid(&self, uuid: &str) -> YggResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(select_profile!("uuid = ?1"))
            .bind(uuid)
            .fetch_optional(&self.db)
            .await?;
        Ok(profile)
    }

    /// Get profile by exact display name
    pub async fn profile_by_name(&self, name: &str) -> YggResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(select_profile!("name = ?1"))
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(profile)
    }

    /// The account's selected profile, if it has one
    pub async fn selected_profile(&self, account: &Account) -> YggResult<Option<Profile>> {
        let Some(profile_id) = account.selected_profile else {
            return Ok(None);
        };

        let profile = self.get_profile(profile_id).await?;
        Ok(profile.filter(|p| {
            if p.owner != account.id {
                tracing::warn!(account_id = account.id, profile_id, "selected profile owned by another account");
            }
            p.owner == account.id
        }))
    }

    /// Simple form of a profile, used for `selectedProfile`
    pub async fn simple_profile(&self, profile_id: Option<i64>) -> YggResult<Option<SimpleProfile>> {
        let Some(profile_id) = profile_id else {
            return Ok(None);
        };
        Ok(self.get_profile(profile_id).await?.map(|p| Self::to_simple(&p)))
    }

    /// All profiles owned by an account
    pub async fn list_profiles(&self, account_id: i64) -> YggResult<Vec<SimpleProfile>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT uuid, name FROM profiles WHERE owner = ?1 ORDER BY id")
                .bind(account_id)
                .fetch_all(&self.db)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| SimpleProfile { id, name })
            .collect())
    }

    /// Case-insensitive batch lookup of display names
    ///
    /// Names that do not exist are left out; the rest come back with their
    /// canonical spelling.
    pub async fn lookup_names(&self, names: &[String]) -> YggResult<Vec<SimpleProfile>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        // Stay well under SQLite's bound parameter limit
        let mut rows = Vec::new();
        for batch in names.chunks(LOOKUP_BATCH) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT id, uuid, name FROM profiles WHERE name COLLATE NOCASE IN (");
            let mut separated = query.separated(", ");
            for name in batch {
                separated.push_bind(name.as_str());
            }
            separated.push_unseparated(")");

            rows.extend(
                query
                    .build_query_as::<(i64, String, String)>()
                    .fetch_all(&self.db)
                    .await?,
            );
        }

        rows.sort_by_key(|(id, _, _)| *id);
        rows.dedup_by_key(|(id, _, _)| *id);

        Ok(rows
            .into_iter()
            .map(|(_, id, name)| SimpleProfile { id, name })
            .collect())
    }

    pub fn to_simple(profile: &Profile) -> SimpleProfile {
        SimpleProfile {
            id: profile.uuid.clone(),
            name: profile.name.clone(),
        }
    }

    /// Full representation with every skin and owned cape
    pub async fn full_profile(&self, profile: &Profile) -> YggResult<FullProfile> {
        let mut skins = Vec::new();
        let variant = profile.skin();
        if variant != SkinVariant::None {
            skins.push(SkinView {
                id: profile.uuid.clone(),
                state: TextureState::Active,
                url: self.skin_url(&profile.uuid),
                variant: variant.as_str().to_string(),
            });
        }

        let mut capes = Vec::new();
        for cape_id in profile.owned_cape_ids() {
            let Some(cape) = self.get_cape(cape_id).await? else {
                tracing::warn!(profile = %profile.uuid, cape_id, "profile references a missing cape");
                continue;
            };
            let state = if profile.active_cape == Some(cape.id) {
                TextureState::Active
            } else {
                TextureState::Inactive
            };
            capes.push(CapeView {
                url: self.cape_url(&cape.name),
                id: cape.name,
                state,
                alias: cape.alias,
            });
        }

        Ok(FullProfile {
            id: profile.uuid.clone(),
            name: profile.name.clone(),
            skins,
            capes,
        })
    }

    /// Representation with the base64 `textures` property
    ///
    /// The payload is not signed.
    pub async fn textured_profile(&self, profile: &Profile) -> YggResult<TexturedProfile> {
        let overrides = &self.config.textures.overrides;
        let mut textures = TextureMap::default();

        if profile.skin() != SkinVariant::None {
            let url = overrides
                .skins
                .get(&profile.uuid)
                .cloned()
                .unwrap_or_else(|| self.skin_url(&profile.uuid));
            textures.skin = Some(TextureUrl { url });
        }

        if let Some(active_cape) = profile.active_cape {
            let url = match overrides.capes.get(&profile.uuid) {
                Some(url) => Some(url.clone()),
                None => self
                    .get_cape(active_cape)
                    .await?
                    .map(|cape| self.cape_url(&cape.name)),
            };
            textures.cape = url.map(|url| TextureUrl { url });
        }

        let payload = TexturesPayload {
            timestamp: chrono::Utc::now().timestamp_millis(),
            profile_id: profile.uuid.clone(),
            profile_name: profile.name.clone(),
            textures,
        };

        Ok(TexturedProfile {
            id: profile.undashed_uuid(),
            name: profile.name.clone(),
            properties: vec![Property {
                name: TEXTURES_PROPERTY.to_string(),
                value: payload.encode()?,
            }],
        })
    }

    /// Stored attributes of a profile
    pub fn attributes(&self, profile: &Profile) -> YggResult<serde_json::Value> {
        Ok(serde_json::from_str(&profile.attributes)?)
    }

    pub async fn set_skin_variant(&self, profile_id: i64, variant: SkinVariant) -> YggResult<()> {
        sqlx::query("UPDATE profiles SET skin_variant = ?1 WHERE id = ?2")
            .bind(variant.as_str())
            .bind(profile_id)
            .execute(&self.db)
            .await?;

        tracing::debug!(profile_id, variant = variant.as_str(), "set skin variant");
        Ok(())
    }

    pub async fn clear_skin(&self, profile_id: i64) -> YggResult<()> {
        self.set_skin_variant(profile_id, SkinVariant::None).await
    }

    /// Activate one of the profile's capes
    ///
    /// Without a cape name, a profile owning exactly one cape activates that one.
    pub async fn set_active_cape(&self, profile: &Profile, cape_name: Option<&str>) -> YggResult<Cape> {
        let owned = profile.owned_cape_ids();

        let cape = match cape_name {
            Some(name) => self
                .cape_by_name(name)
                .await?
                .ok_or_else(|| YggError::bad_request("cape does not exist"))?,
            None if owned.len() == 1 => self
                .get_cape(owned[0])
                .await?
                .ok_or_else(|| YggError::bad_request("cape does not exist"))?,
            None => return Err(YggError::bad_request("No capeId provided.")),
        };

        if !owned.contains(&cape.id) {
            return Err(YggError::bad_request("profile does not own cape"));
        }

        sqlx::query("UPDATE profiles SET active_cape = ?1 WHERE id = ?2")
            .bind(cape.id)
            .bind(profile.id)
            .execute(&self.db)
            .await?;

        tracing::debug!(profile = %profile.uuid, cape = %cape.name, "activated cape");
        Ok(cape)
    }

    pub async fn clear_active_cape(&self, profile_id: i64) -> YggResult<()> {
        sqlx::query("UPDATE profiles SET active_cape = NULL WHERE id = ?1")
            .bind(profile_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn create_cape(&self, name: &str, alias: &str) -> YggResult<Cape> {
        if self.cape_by_name(name).await?.is_some() {
            return Err(YggError::bad_request("Cape already exists."));
        }

        let id = sqlx::query("INSERT INTO capes (name, alias) VALUES (?1, ?2)")
            .bind(name)
            .bind(alias)
            .execute(&self.db)
            .await?
            .last_insert_rowid();

        Ok(Cape {
            id,
            name: name.to_string(),
            alias: alias.to_string(),
        })
    }

    /// Add a cape to the profile's owned list
    pub async fn grant_cape(&self, profile: &Profile, cape_name: &str) -> YggResult<Cape> {
        let cape = self
            .cape_by_name(cape_name)
            .await?
            .ok_or_else(|| YggError::bad_request("cape does not exist"))?;

        let mut owned = profile.owned_cape_ids();
        if !owned.contains(&cape.id) {
            owned.push(cape.id);
            let capes = owned
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            sqlx::query("UPDATE profiles SET capes = ?1 WHERE id = ?2")
                .bind(capes)
                .bind(profile.id)
                .execute(&self.db)
                .await?;
        }

        Ok(cape)
    }

    pub async fn get_cape(&self, id: i64) -> YggResult<Option<Cape>> {
        let cape = sqlx::query_as::<_, Cape>("SELECT id, name, alias FROM capes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(cape)
    }

    pub async fn cape_by_name(&self, name: &str) -> YggResult<Option<Cape>> {
        let cape = sqlx::query_as::<_, Cape>("SELECT id, name, alias FROM capes WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(cape)
    }

    fn skin_url(&self, uuid: &str) -> String {
        format!("{}/textures/skins/{}", self.config.service.external_url, uuid)
    }

    fn cape_url(&self, name: &str) -> String {
        format!("{}/textures/capes/{}", self.config.service.external_url, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, testing};

    async fn setup() -> (ProfileResolver, SqlitePool) {
        setup_with(ServerConfig::default()).await
    }

    async fn setup_with(mut config: ServerConfig) -> (ProfileResolver, SqlitePool) {
        config.service.external_url = "https://auth.example.com".to_string();
        let db = testing::memory_db().await;
        (ProfileResolver::new(db.clone(), Arc::new(config)), db)
    }

    async fn account(db: &SqlitePool, id: i64) -> Account {
        sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, language, country, selected_profile FROM accounts WHERE id = ?1",
        )
        .bind(id)
        .fetch_one(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_profile_is_selected() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;

        let first = resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();
        let second = resolver
            .create_profile("Alex", owner, ProfilePrivileges::default())
            .await
            .unwrap();

        let account = account(&db, owner).await;
        assert_eq!(account.selected_profile, Some(first.id));

        let selected = resolver.selected_profile(&account).await.unwrap().unwrap();
        assert_eq!(selected.uuid, first.uuid);

        let listed = resolver.list_profiles(owner).await.unwrap();
        assert_eq!(
            listed,
            vec![ProfileResolver::to_simple(&first), ProfileResolver::to_simple(&second)]
        );
    }

    #[tokio::test]
    async fn test_profile_names_are_unique_ignoring_case() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;

        resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();
        let err = resolver
            .create_profile("steve", owner, ProfilePrivileges::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_string(), "Profile name already taken.");

        let err = resolver
            .create_profile("Other", 999, ProfilePrivileges::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Account does not exist.");
        assert_eq!(resolver.list_profiles(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_selected_profile_of_account_without_one() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;

        let account = account(&db, owner).await;
        assert!(resolver.selected_profile(&account).await.unwrap().is_none());
        assert!(resolver.simple_profile(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_names_is_case_insensitive() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let steve = resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();

        let found = resolver
            .lookup_names(&["STEVE".to_string(), "nobody".to_string()])
            .await
            .unwrap();
        assert_eq!(found, vec![ProfileResolver::to_simple(&steve)]);
        assert_eq!(found[0].name, "Steve");

        assert!(resolver.lookup_names(&[]).await.unwrap().is_empty());

        // Exact lookup stays case-sensitive
        assert!(resolver.profile_by_name("steve").await.unwrap().is_none());
        assert!(resolver.profile_by_name("Steve").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_names_past_the_parameter_limit() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let steve = resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();

        let mut names: Vec<String> = (0..40_000).map(|i| format!("p{}", i)).collect();
        names.push("steve".to_string());
        names.push("Steve".to_string());

        let found = resolver.lookup_names(&names).await.unwrap();
        assert_eq!(found, vec![ProfileResolver::to_simple(&steve)]);
    }

    #[tokio::test]
    async fn test_full_profile() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let profile = resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();

        let bare = resolver.full_profile(&profile).await.unwrap();
        assert!(bare.skins.is_empty());
        assert!(bare.capes.is_empty());

        resolver.create_cape("migrator", "Migrator").await.unwrap();
        resolver.create_cape("founder", "Founder").await.unwrap();
        resolver.grant_cape(&profile, "migrator").await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();
        resolver.grant_cape(&profile, "founder").await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();
        resolver.set_active_cape(&profile, Some("founder")).await.unwrap();
        resolver.set_skin_variant(profile.id, SkinVariant::Slim).await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();

        let full = resolver.full_profile(&profile).await.unwrap();
        assert_eq!(full.id, profile.uuid);
        assert_eq!(full.skins.len(), 1);
        assert_eq!(full.skins[0].variant, "SLIM");
        assert_eq!(
            full.skins[0].url,
            format!("https://auth.example.com/textures/skins/{}", profile.uuid)
        );

        assert_eq!(full.capes.len(), 2);
        assert_eq!(full.capes[0].id, "migrator");
        assert_eq!(full.capes[0].state, TextureState::Inactive);
        assert_eq!(full.capes[1].id, "founder");
        assert_eq!(full.capes[1].alias, "Founder");
        assert_eq!(full.capes[1].state, TextureState::Active);
        assert_eq!(full.capes[1].url, "https://auth.example.com/textures/capes/founder");
    }

    #[tokio::test]
    async fn test_textured_profile() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let profile = resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();

        let bare = resolver.textured_profile(&profile).await.unwrap();
        assert_eq!(bare.id, profile.undashed_uuid());
        assert_eq!(bare.name, "Steve");
        assert_eq!(bare.properties.len(), 1);
        assert_eq!(bare.properties[0].name, "textures");
        let payload = bare.textures().unwrap();
        assert_eq!(payload.profile_id, profile.uuid);
        assert_eq!(payload.profile_name, "Steve");
        assert!(payload.textures.skin.is_none());
        assert!(payload.textures.cape.is_none());

        resolver.create_cape("founder", "Founder").await.unwrap();
        resolver.grant_cape(&profile, "founder").await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();
        resolver.set_active_cape(&profile, None).await.unwrap();
        resolver.set_skin_variant(profile.id, SkinVariant::Classic).await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();

        let payload = resolver.textured_profile(&profile).await.unwrap().textures().unwrap();
        assert_eq!(
            payload.textures.skin.unwrap().url,
            format!("https://auth.example.com/textures/skins/{}", profile.uuid)
        );
        assert_eq!(
            payload.textures.cape.unwrap().url,
            "https://auth.example.com/textures/capes/founder"
        );
    }

    #[tokio::test]
    async fn test_texture_overrides() {
        let (_, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let plain = ProfileResolver::new(db.clone(), Arc::new(ServerConfig::default()));
        let profile = plain
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();
        plain.set_skin_variant(profile.id, SkinVariant::Classic).await.unwrap();
        let profile = plain.get_profile(profile.id).await.unwrap().unwrap();

        let mut config = ServerConfig::default();
        config
            .textures
            .overrides
            .skins
            .insert(profile.uuid.clone(), "https://cdn.example.com/steve.png".to_string());
        let resolver = ProfileResolver::new(db, Arc::new(config));

        let payload = resolver.textured_profile(&profile).await.unwrap().textures().unwrap();
        assert_eq!(payload.textures.skin.unwrap().url, "https://cdn.example.com/steve.png");
    }

    #[tokio::test]
    async fn test_cape_activation_rules() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let profile = resolver
            .create_profile("Steve", owner, ProfilePrivileges::default())
            .await
            .unwrap();
        resolver.create_cape("founder", "Founder").await.unwrap();
        resolver.create_cape("migrator", "Migrator").await.unwrap();

        let err = resolver.set_active_cape(&profile, None).await.unwrap_err();
        assert_eq!(err.to_string(), "No capeId provided.");

        let err = resolver.set_active_cape(&profile, Some("founder")).await.unwrap_err();
        assert_eq!(err.to_string(), "profile does not own cape");

        let err = resolver.set_active_cape(&profile, Some("missing")).await.unwrap_err();
        assert_eq!(err.to_string(), "cape does not exist");

        resolver.grant_cape(&profile, "founder").await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();
        let cape = resolver.set_active_cape(&profile, None).await.unwrap();
        assert_eq!(cape.name, "founder");

        resolver.clear_active_cape(profile.id).await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(profile.active_cape, None);

        // Granting twice keeps a single entry
        resolver.grant_cape(&profile, "founder").await.unwrap();
        let profile = resolver.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(profile.owned_cape_ids(), vec![cape.id]);
    }

    #[tokio::test]
    async fn test_skin_and_attributes() {
        let (resolver, db) = setup().await;
        let owner = testing::insert_account(&db, "a@x.com").await;
        let privileges = ProfilePrivileges {
            chat: false,
            profanity_filter: true,
            ..ProfilePrivileges::default()
        };
        let profile = resolver.create_profile("Steve", owner, privileges).await.unwrap();

        let attributes = resolver.attributes(&profile).unwrap();
        assert_eq!(attributes["privileges"]["onlineChat"]["enabled"], false);
        assert_eq!(attributes["privileges"]["multiplayerServer"]["enabled"], true);
        assert_eq!(attributes["privileges"]["telemetry"]["enabled"], false);
        assert_eq!(attributes["profanityFilterPreferences"]["profanityFilterOn"], true);

        resolver.set_skin_variant(profile.id, SkinVariant::Slim).await.unwrap();
        let updated = resolver.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(updated.skin(), SkinVariant::Slim);

        resolver.clear_skin(profile.id).await.unwrap();
        let cleared = resolver.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(cleared.skin(), SkinVariant::None);
    }
}
