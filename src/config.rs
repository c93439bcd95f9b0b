/// Configuration management for Lodestone
use crate::error::{YggError, YggResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub tokens: TokenConfig,
    pub authentication: AuthConfig,
    pub textures: TextureConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL used when building texture URLs
    pub external_url: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub textures_directory: PathBuf,
    pub static_directory: Option<PathBuf>,
}

/// Token lifetimes, in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Absolute lifetime; tokens past it are swept
    pub ttl: i64,
    /// Window after issuance in which a token passes plain validation
    pub fresh_window: i64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

/// Texture configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureConfig {
    pub overrides: TextureOverrides,
    pub max_skin_bytes: usize,
}

/// Operator-supplied texture URLs, keyed by profile UUID
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureOverrides {
    #[serde(default)]
    pub skins: HashMap<String, String>,
    #[serde(default)]
    pub capes: HashMap<String, String>,
}

/// Join/hasJoined handshake configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Require a pending join for the requested server before answering hasJoined
    pub require_join: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_requests_per_minute: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_directory = PathBuf::from("./data");
        ServerConfig {
            service: ServiceConfig {
                hostname: "0.0.0.0".to_string(),
                port: 3000,
                external_url: "http://localhost:3000".to_string(),
            },
            storage: StorageConfig {
                database: data_directory.join("lodestone.sqlite"),
                textures_directory: data_directory.join("textures"),
                static_directory: None,
                data_directory,
            },
            tokens: TokenConfig {
                ttl: 604_800,
                fresh_window: 86_400,
            },
            authentication: AuthConfig { bcrypt_cost: 10 },
            textures: TextureConfig {
                overrides: TextureOverrides::default(),
                max_skin_bytes: 1024 * 1024,
            },
            session: SessionConfig { require_join: true },
            rate_limit: RateLimitConfig {
                enabled: true,
                auth_requests_per_minute: 60,
            },
            logging: LoggingConfig {
                level: "lodestone=debug,tower_http=debug".to_string(),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> YggResult<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| YggError::bad_request(format!("Invalid value for {}: {}", name, value))),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> YggResult<Self> {
        dotenv::dotenv().ok();
        let defaults = ServerConfig::default();

        let hostname = env::var("LODESTONE_HOSTNAME").unwrap_or(defaults.service.hostname);
        let port = parse_var("LODESTONE_PORT", defaults.service.port)?;
        let external_url = env::var("LODESTONE_EXTERNAL_URL")
            .unwrap_or(defaults.service.external_url)
            .trim_end_matches('/')
            .to_string();

        let data_directory: PathBuf = env::var("LODESTONE_DATA_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.data_directory);
        let database = env::var("LODESTONE_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("lodestone.sqlite"));
        let textures_directory = env::var("LODESTONE_TEXTURES_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("textures"));
        let static_directory = env::var("LODESTONE_STATIC_DIRECTORY").ok().map(PathBuf::from);

        let overrides = match env::var("LODESTONE_TEXTURE_OVERRIDES") {
            Ok(path) => Self::load_overrides(&PathBuf::from(path))?,
            Err(_) => TextureOverrides::default(),
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                external_url,
            },
            storage: StorageConfig {
                data_directory,
                database,
                textures_directory,
                static_directory,
            },
            tokens: TokenConfig {
                ttl: parse_var("LODESTONE_TOKEN_TTL_SECONDS", defaults.tokens.ttl)?,
                fresh_window: parse_var(
                    "LODESTONE_TOKEN_FRESH_SECONDS",
                    defaults.tokens.fresh_window,
                )?,
            },
            authentication: AuthConfig {
                bcrypt_cost: parse_var(
                    "LODESTONE_BCRYPT_COST",
                    defaults.authentication.bcrypt_cost,
                )?,
            },
            textures: TextureConfig {
                overrides,
                max_skin_bytes: parse_var(
                    "LODESTONE_MAX_SKIN_BYTES",
                    defaults.textures.max_skin_bytes,
                )?,
            },
            session: SessionConfig {
                require_join: parse_var(
                    "LODESTONE_SESSION_REQUIRE_JOIN",
                    defaults.session.require_join,
                )?,
            },
            rate_limit: RateLimitConfig {
                enabled: parse_var("LODESTONE_RATE_LIMITS_ENABLED", defaults.rate_limit.enabled)?,
                auth_requests_per_minute: parse_var(
                    "LODESTONE_AUTH_REQUESTS_PER_MINUTE",
                    defaults.rate_limit.auth_requests_per_minute,
                )?,
            },
            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or(defaults.logging.level),
            },
        })
    }

    /// Read the texture override file
    fn load_overrides(path: &PathBuf) -> YggResult<TextureOverrides> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            YggError::bad_request(format!("Failed to read texture overrides {:?}: {}", path, e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> YggResult<()> {
        if self.service.external_url.is_empty() {
            return Err(YggError::bad_request("External URL cannot be empty"));
        }

        if self.tokens.fresh_window > self.tokens.ttl {
            return Err(YggError::bad_request(
                "Token freshness window cannot exceed the token lifetime",
            ));
        }

        if !(4..=31).contains(&self.authentication.bcrypt_cost) {
            return Err(YggError::bad_request("bcrypt cost must be between 4 and 31"));
        }

        Ok(())
    }
}
