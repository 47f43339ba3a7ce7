use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "parlor.toml",
    "config/parlor.toml",
    "crates/config/parlor.toml",
    "../parlor.toml",
    "../config/parlor.toml",
    "../crates/config/parlor.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://parlor.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Tunables for conversation listing, search and read-state fan-out.
///
/// ```
/// use parlor_config::MessagingConfig;
///
/// let messaging = MessagingConfig::default();
/// assert_eq!(messaging.search_default_limit, 50);
/// assert!(messaging.search_default_limit <= messaging.search_max_limit);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "MessagingConfig::default_search_limit")]
    pub search_default_limit: u32,
    #[serde(default = "MessagingConfig::default_search_max_limit")]
    pub search_max_limit: u32,
    #[serde(default = "MessagingConfig::default_page_limit")]
    pub message_page_limit: u32,
    #[serde(default = "MessagingConfig::default_read_event_capacity")]
    pub read_event_capacity: usize,
}

impl MessagingConfig {
    const fn default_search_limit() -> u32 {
        50
    }

    const fn default_search_max_limit() -> u32 {
        200
    }

    const fn default_page_limit() -> u32 {
        100
    }

    const fn default_read_event_capacity() -> usize {
        256
    }

    /// Reject combinations the services cannot honour.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.search_max_limit > 0, "messaging.search_max_limit must be positive");
        ensure!(
            self.search_default_limit > 0,
            "messaging.search_default_limit must be positive"
        );
        ensure!(
            self.search_default_limit <= self.search_max_limit,
            "messaging.search_default_limit ({}) exceeds messaging.search_max_limit ({})",
            self.search_default_limit,
            self.search_max_limit
        );
        ensure!(self.message_page_limit > 0, "messaging.message_page_limit must be positive");
        ensure!(
            self.read_event_capacity > 0,
            "messaging.read_event_capacity must be positive"
        );
        Ok(())
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            search_default_limit: Self::default_search_limit(),
            search_max_limit: Self::default_search_max_limit(),
            message_page_limit: Self::default_page_limit(),
            read_event_capacity: Self::default_read_event_capacity(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use parlor_config::load;
///
/// std::env::remove_var("PARLOR_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", session_ttl)?
        .set_default(
            "messaging.search_default_limit",
            i64::from(defaults.messaging.search_default_limit),
        )?
        .set_default(
            "messaging.search_max_limit",
            i64::from(defaults.messaging.search_max_limit),
        )?
        .set_default(
            "messaging.message_page_limit",
            i64::from(defaults.messaging.message_page_limit),
        )?
        .set_default(
            "messaging.read_event_capacity",
            i64::try_from(defaults.messaging.read_event_capacity).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("PARLOR").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("PARLOR_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via PARLOR_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    config
        .messaging
        .validate()
        .context("invalid messaging configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
