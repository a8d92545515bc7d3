//! Portfolio Accounts API
//!
//! Account management for a personal portfolio dashboard:
//! - Registration with avatar and resume uploads
//! - Cookie/JWT sessions
//! - Profile and password management
//! - Email-based password recovery

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use api::state::AppState;
use config::{MailProvider, MediaProvider, StorageBackend};
use domain::media::MediaStore;
use domain::notification::Notifier;
use domain::user::{UserId, UserRepository};
use infrastructure::{
    auth::{CookieConfig, JwtConfig, JwtService, SessionIssuer},
    mail::{HttpMailer, HttpMailerConfig, LogMailer},
    media::{CloudinaryConfig, CloudinaryMediaStore, InMemoryMediaStore},
    storage::{connect_pool, PostgresConfig},
    user::{AccountService, AccountSettings, Argon2Hasher, InMemoryUserRepository, PostgresUserRepository},
};
use rand::Rng;
use tracing::{info, warn};

/// Create the application state with all collaborators wired from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let users = create_user_repository(config).await?;
    let media = create_media_store(config)?;
    let notifier = create_notifier(config)?;
    let sessions = create_session_issuer(config);

    let portfolio_user_id = config
        .portfolio
        .user_id
        .as_deref()
        .map(UserId::new)
        .transpose()
        .context("Invalid portfolio.user_id")?;
    if portfolio_user_id.is_none() {
        warn!("No portfolio.user_id configured; /portfolio-user will answer 404");
    }

    let settings = AccountSettings {
        dashboard_url: config.dashboard.url_or_default().to_string(),
        portfolio_user_id,
        reset_token_ttl: chrono::Duration::minutes(config.password_reset.token_ttl_minutes),
    };

    let account_service = AccountService::new(
        users,
        media,
        notifier,
        Arc::new(Argon2Hasher::new()),
        sessions,
        settings,
    );

    Ok(AppState::new(Arc::new(account_service)))
}

async fn create_user_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory user store");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url (or DATABASE_URL) is required for the postgres backend")?;
            let pool = connect_pool(
                &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
            )
            .await?;
            info!("Using PostgreSQL user store");
            Ok(Arc::new(PostgresUserRepository::new(pool)))
        }
    }
}

fn create_media_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    let media = &config.media;

    match media.provider {
        MediaProvider::Memory => {
            info!("Using in-memory media store");
            Ok(Arc::new(InMemoryMediaStore::new()))
        }
        MediaProvider::Cloudinary => {
            let (Some(cloud_name), Some(api_key), Some(api_secret)) = (
                media.cloud_name.as_deref(),
                media.api_key.as_deref(),
                media.api_secret.as_deref(),
            ) else {
                anyhow::bail!("media.cloud_name, media.api_key and media.api_secret are required for cloudinary");
            };

            let mut cloudinary = CloudinaryConfig::new(cloud_name, api_key, api_secret);
            if let Some(base_url) = media.base_url.as_deref() {
                cloudinary = cloudinary.with_base_url(base_url);
            }

            info!(cloud_name = %cloud_name, "Using Cloudinary media store");
            Ok(Arc::new(CloudinaryMediaStore::new(cloudinary)?))
        }
    }
}

fn create_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    let mail = &config.mail;

    match mail.provider {
        MailProvider::Log => {
            info!("Using log mailer; emails are written to the log only");
            Ok(Arc::new(LogMailer::new()))
        }
        MailProvider::Http => {
            let (Some(endpoint), Some(api_key)) = (mail.endpoint.as_deref(), mail.api_key.as_deref())
            else {
                anyhow::bail!("mail.endpoint and mail.api_key are required for the http mailer");
            };

            info!(endpoint = %endpoint, "Using HTTP mailer");
            Ok(Arc::new(HttpMailer::new(HttpMailerConfig::new(
                endpoint,
                api_key,
                mail.from.clone(),
            ))?))
        }
    }
}

fn create_session_issuer(config: &AppConfig) -> SessionIssuer {
    let secret = config.auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!(
            "No JWT secret configured. Generating random secret. \
            Sessions will NOT persist across restarts. \
            Set JWT_SECRET for persistent sessions."
        );
        generate_random_secret()
    });

    let jwt = JwtService::new(JwtConfig::new(secret, config.auth.jwt_expiration_hours));
    let cookie = CookieConfig {
        expire_days: config.auth.cookie_expire_days,
        secure: config.auth.cookie_secure,
    };

    SessionIssuer::new(Arc::new(jwt), cookie)
}

/// Generate a random JWT secret
fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
