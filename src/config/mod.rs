//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DashboardConfig, LogFormat, LoggingConfig, MailConfig, MailProvider,
    MediaConfig, MediaProvider, PasswordResetConfig, PortfolioConfig, ServerConfig,
    StorageBackend, StorageConfig, DEFAULT_DASHBOARD_URL,
};
