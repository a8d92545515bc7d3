use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub mail: MailConfig,
    pub dashboard: DashboardConfig,
    pub portfolio: PortfolioConfig,
    pub password_reset: PasswordResetConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, uploads included
    pub max_upload_bytes: usize,
    /// Origins allowed to send credentialed requests. Empty allows any origin without credentials.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub jwt_expiration_hours: u64,
    pub cookie_expire_days: u32,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaProvider {
    #[default]
    Memory,
    Cloudinary,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub provider: MediaProvider,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    #[default]
    Log,
    Http,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub provider: MailProvider,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Account shown on the public portfolio
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordResetConfig {
    pub token_ttl_minutes: i64,
}

pub const DEFAULT_DASHBOARD_URL: &str = "http://localhost:5173";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiration_hours: 24,
            cookie_expire_days: 7,
            cookie_secure: false,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            provider: MediaProvider::default(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
            base_url: None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::default(),
            endpoint: None,
            api_key: None,
            from: "noreply@localhost".to_string(),
        }
    }
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 15,
        }
    }
}

macro_rules! redacted_debug {
    ($ty:ty, $name:literal, [$($field:ident),*], [$($secret:ident),*]) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct($name)
                    $(.field(stringify!($field), &self.$field))*
                    $(.field(stringify!($secret), &self.$secret.as_ref().map(|_| "[hidden]")))*
                    .finish()
            }
        }
    };
}

redacted_debug!(StorageConfig, "StorageConfig", [backend, max_connections], [database_url]);
redacted_debug!(
    AuthConfig,
    "AuthConfig",
    [jwt_expiration_hours, cookie_expire_days, cookie_secure],
    [jwt_secret]
);
redacted_debug!(
    MediaConfig,
    "MediaConfig",
    [provider, cloud_name, base_url],
    [api_key, api_secret]
);
redacted_debug!(MailConfig, "MailConfig", [provider, endpoint, from], [api_key]);

impl DashboardConfig {
    pub fn url_or_default(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_DASHBOARD_URL)
    }
}

impl AppConfig {
    /// Load `config/default`, `config/local`, then `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_fallbacks(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Fill unset values from the conventional plain variables
    /// (`DATABASE_URL`, `JWT_SECRET`, `DASHBOARD_URL`)
    pub fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fallback = |current: &mut Option<String>, key: &str| {
            if current.is_none() {
                *current = lookup(key).filter(|v| !v.is_empty());
            }
        };

        fallback(&mut self.storage.database_url, "DATABASE_URL");
        fallback(&mut self.auth.jwt_secret, "JWT_SECRET");
        fallback(&mut self.dashboard.url, "DASHBOARD_URL");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.auth.jwt_expiration_hours, 24);
        assert_eq!(config.auth.cookie_expire_days, 7);
        assert_eq!(config.media.provider, MediaProvider::Memory);
        assert_eq!(config.mail.provider, MailProvider::Log);
        assert_eq!(config.password_reset.token_ttl_minutes, 15);
        assert_eq!(config.dashboard.url_or_default(), DEFAULT_DASHBOARD_URL);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9000

            [storage]
            backend = "postgres"
            database_url = "postgres://db/portfolio"

            [media]
            provider = "cloudinary"
            cloud_name = "demo"

            [logging]
            format = "json"

            [portfolio]
            user_id = "user-1"
            "#,
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.media.cloud_name.as_deref(), Some("demo"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.portfolio.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_env_fallbacks_fill_only_unset_values() {
        let mut config = from_toml(
            r#"
            [auth]
            jwt_secret = "from-config"
            "#,
        );
        let env: HashMap<&str, &str> = [
            ("JWT_SECRET", "from-env"),
            ("DATABASE_URL", "postgres://env/db"),
            ("DASHBOARD_URL", "https://dash.example.com"),
        ]
        .into_iter()
        .collect();

        config.apply_env_fallbacks(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.auth.jwt_secret.as_deref(), Some("from-config"));
        assert_eq!(config.storage.database_url.as_deref(), Some("postgres://env/db"));
        assert_eq!(config.dashboard.url_or_default(), "https://dash.example.com");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("jwt-secret-value".to_string());
        config.media.api_secret = Some("cloud-secret-value".to_string());

        let debug = format!("{:?}", config);
        assert!(!debug.contains("jwt-secret-value"));
        assert!(!debug.contains("cloud-secret-value"));
    }
}
