/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    db,
    error::YggResult,
    profile::ProfileResolver,
    rate_limit::RateLimiter,
    session::SessionHandshake,
    texture_store::TextureStore,
    token::TokenStore,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: AccountManager,
    pub tokens: TokenStore,
    pub profiles: ProfileResolver,
    pub sessions: SessionHandshake,
    pub textures: TextureStore,
    pub rate_limiter: RateLimiter,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> YggResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        Self::from_pool(config, pool)
    }

    /// Wire services around an existing, migrated pool
    pub fn from_pool(config: ServerConfig, pool: SqlitePool) -> YggResult<Self> {
        let config = Arc::new(config);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("lodestone/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let account_manager = AccountManager::new(pool.clone(), config.authentication.clone());
        let tokens = TokenStore::new(pool.clone(), config.tokens);
        let profiles = ProfileResolver::new(pool.clone(), config.clone());
        let sessions = SessionHandshake::new(
            pool.clone(),
            tokens.clone(),
            profiles.clone(),
            config.session,
        );
        let textures = TextureStore::on_disk(
            config.storage.textures_directory.clone(),
            &config.textures,
            http,
        );
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Ok(Self {
            config,
            db: pool,
            account_manager,
            tokens,
            profiles,
            sessions,
            textures,
            rate_limiter,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> YggResult<()> {
        let dirs = [
            config.storage.data_directory.clone(),
            config.storage.textures_directory.join("skins"),
            config.storage.textures_directory.join("capes"),
        ];

        for dir in dirs {
            tokio::fs::create_dir_all(dir).await?;
        }

        Ok(())
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
