//! Account service: registration, sessions, profile and password management

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::media::{Asset, MediaFolder, MediaStore, UploadFile};
use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::user::{
    describe_validation_errors, validate_password, PasswordReset, ProfileUpdate, Registration,
    User, UserId, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::{Session, SessionCookie, SessionIssuer};
use crate::infrastructure::observability::record_account_event;

use super::password::PasswordHasher;
use super::reset_token::{hash_reset_token, ResetToken};

pub const RESET_EMAIL_SUBJECT: &str = "Personal Portfolio Dashboard Password Recovery";

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_RESET_TOKEN: &str = "Reset password token is invalid or has been expired";
const NOT_AUTHENTICATED: &str = "User not authenticated";

/// Settings that shape account behaviour
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Base URL of the dashboard, used to build reset links
    pub dashboard_url: String,
    /// Account published as the public portfolio profile
    pub portfolio_user_id: Option<UserId>,
    /// How long a reset token stays valid
    pub reset_token_ttl: Duration,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            dashboard_url: "http://localhost:5173".to_string(),
            portfolio_user_id: None,
            reset_token_ttl: Duration::minutes(15),
        }
    }
}

/// Files accompanying a registration or profile update
#[derive(Debug, Clone, Default)]
pub struct ProfileFiles {
    pub avatar: Option<UploadFile>,
    pub resume: Option<UploadFile>,
}

impl ProfileFiles {
    pub fn new(avatar: Option<UploadFile>, resume: Option<UploadFile>) -> Self {
        // Empty parts count as missing
        Self {
            avatar: avatar.filter(|f| !f.is_empty()),
            resume: resume.filter(|f| !f.is_empty()),
        }
    }
}

/// Request for changing the password of a signed-in user
#[derive(Clone, Default)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

/// A user together with a freshly issued session
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user: User,
    pub session: Session,
}

/// Account operations over the user store, media store and notifier
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
    notifier: Arc<dyn Notifier>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: SessionIssuer,
    settings: AccountSettings,
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("users", &self.users)
            .field("hasher", &self.hasher)
            .field("sessions", &self.sessions)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
        notifier: Arc<dyn Notifier>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: SessionIssuer,
        settings: AccountSettings,
    ) -> Self {
        Self {
            users,
            media,
            notifier,
            hasher,
            sessions,
            settings,
        }
    }

    /// Create an account with its avatar and resume, then sign it in
    pub async fn register(
        &self,
        registration: Registration,
        files: ProfileFiles,
    ) -> Result<SessionGrant, DomainError> {
        let result = self.register_inner(registration, files).await;
        record_account_event("register", result.is_ok());
        result
    }

    async fn register_inner(
        &self,
        registration: Registration,
        files: ProfileFiles,
    ) -> Result<SessionGrant, DomainError> {
        let (Some(avatar_file), Some(resume_file)) = (files.avatar, files.resume) else {
            return Err(DomainError::validation("Avatar and resume are required"));
        };

        registration
            .validate()
            .map_err(|e| DomainError::validation(describe_validation_errors(&e)))?;

        if self.users.email_exists(&registration.email).await? {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                registration.email
            )));
        }

        let password_hash = self.hasher.hash(&registration.password)?;

        let avatar = self.media.upload(MediaFolder::Avatars, avatar_file).await?;
        let resume = match self.media.upload(MediaFolder::Resume, resume_file).await {
            Ok(resume) => resume,
            Err(e) => {
                self.discard(&[&avatar]).await;
                return Err(e);
            }
        };

        let user = User::new(
            UserId::generate(),
            &registration,
            password_hash,
            avatar.clone(),
            resume.clone(),
        );

        let user = match self.users.create(user).await {
            Ok(user) => user,
            Err(e) => {
                self.discard(&[&avatar, &resume]).await;
                return Err(e);
            }
        };

        info!(user_id = %user.id(), email = %user.email(), "User registered");

        let session = self.sessions.issue(&user)?;
        Ok(SessionGrant { user, session })
    }

    /// Verify credentials and issue a session
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionGrant, DomainError> {
        let result = self.login_inner(email, password).await;
        record_account_event("login", result.is_ok());
        result
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<SessionGrant, DomainError> {
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::validation("Email and password are required"));
        }

        let Some(user) = self.users.get_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Err(DomainError::authentication(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify(password, user.password_hash()) {
            debug!(user_id = %user.id(), "Login attempt with wrong password");
            return Err(DomainError::authentication(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id(), "User logged in");

        let session = self.sessions.issue(&user)?;
        Ok(SessionGrant { user, session })
    }

    /// Cookie directives that end the current session
    pub fn logout(&self) -> SessionCookie {
        record_account_event("logout", true);
        SessionCookie::cleared()
    }

    /// Resolve a session token to its user
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let claims = self.sessions.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            DomainError::authentication(NOT_AUTHENTICATED)
        })?;

        let user_id = UserId::new(claims.user_id())
            .map_err(|_| DomainError::authentication(NOT_AUTHENTICATED))?;

        self.users
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::authentication(NOT_AUTHENTICATED))
    }

    /// The signed-in user's own record
    pub async fn get_user(&self, user_id: &UserId) -> Result<User, DomainError> {
        self.load(user_id).await
    }

    /// Apply profile changes, replacing avatar and resume when new files are given.
    ///
    /// New files are uploaded before the record is written. Old assets are only
    /// removed once the write succeeded; if it fails the new uploads are removed
    /// instead.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        files: ProfileFiles,
    ) -> Result<User, DomainError> {
        let result = self.update_profile_inner(user_id, update, files).await;
        record_account_event("update_profile", result.is_ok());
        result
    }

    async fn update_profile_inner(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        files: ProfileFiles,
    ) -> Result<User, DomainError> {
        update
            .validate()
            .map_err(|e| DomainError::validation(describe_validation_errors(&e)))?;

        let mut user = self.load(user_id).await?;

        if update.is_empty() && files.avatar.is_none() && files.resume.is_none() {
            debug!(user_id = %user.id(), "Profile update without changes");
            return Ok(user);
        }

        let new_avatar = match files.avatar {
            Some(file) => Some(self.media.upload(MediaFolder::Avatars, file).await?),
            None => None,
        };
        let new_resume = match files.resume {
            Some(file) => match self.media.upload(MediaFolder::Resume, file).await {
                Ok(asset) => Some(asset),
                Err(e) => {
                    self.discard(&new_avatar.iter().collect::<Vec<_>>()).await;
                    return Err(e);
                }
            },
            None => None,
        };

        user.apply_profile_update(update);

        let mut replaced = Vec::new();
        if let Some(avatar) = &new_avatar {
            replaced.push(user.replace_avatar(avatar.clone()));
        }
        if let Some(resume) = &new_resume {
            replaced.push(user.replace_resume(resume.clone()));
        }

        let user = match self.users.update(&user).await {
            Ok(user) => user,
            Err(e) => {
                let uploaded: Vec<&Asset> = new_avatar.iter().chain(new_resume.iter()).collect();
                self.discard(&uploaded).await;
                return Err(e);
            }
        };

        self.discard(&replaced.iter().collect::<Vec<_>>()).await;

        info!(user_id = %user.id(), assets_replaced = replaced.len(), "Profile updated");
        Ok(user)
    }

    /// Change the password of a signed-in user
    pub async fn update_password(
        &self,
        user_id: &UserId,
        change: PasswordChange,
    ) -> Result<(), DomainError> {
        let result = self.update_password_inner(user_id, change).await;
        record_account_event("update_password", result.is_ok());
        result
    }

    async fn update_password_inner(
        &self,
        user_id: &UserId,
        change: PasswordChange,
    ) -> Result<(), DomainError> {
        if change.current_password.is_empty()
            || change.new_password.is_empty()
            || change.confirm_new_password.is_empty()
        {
            return Err(DomainError::validation("Please fill all fields"));
        }

        let mut user = self.load(user_id).await?;

        if !self
            .hasher
            .verify(&change.current_password, user.password_hash())
        {
            return Err(DomainError::authentication("Incorrect current password"));
        }

        if change.new_password != change.confirm_new_password {
            return Err(DomainError::validation(
                "New password and confirm new password do not match",
            ));
        }

        validate_password(&change.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        user.set_password_hash(self.hasher.hash(&change.new_password)?);
        self.users.update(&user).await?;

        info!(user_id = %user.id(), "Password updated");
        Ok(())
    }

    /// The account published as the public portfolio profile
    pub async fn get_user_for_portfolio(&self) -> Result<User, DomainError> {
        let Some(user_id) = &self.settings.portfolio_user_id else {
            return Err(DomainError::not_found("Portfolio user is not configured"));
        };

        self.load(user_id).await
    }

    /// Open a reset window and email the reset link
    pub async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let result = self.forgot_password_inner(email).await;
        record_account_event("forgot_password", result.is_ok());
        result
    }

    async fn forgot_password_inner(&self, email: &str) -> Result<(), DomainError> {
        if email.is_empty() {
            return Err(DomainError::validation("Email is required"));
        }

        let mut user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        let token = ResetToken::generate();
        let expires_at = Utc::now() + self.settings.reset_token_ttl;
        user.begin_password_reset(PasswordReset::new(token.hash(), expires_at));
        let mut user = self.users.update(&user).await?;

        let reset_url = format!(
            "{}/password/reset/{}",
            self.settings.dashboard_url.trim_end_matches('/'),
            token.raw()
        );
        let body = format!(
            "Your reset password token is:\n\n{}\n\nIf you have not requested this email, please ignore it.",
            reset_url
        );

        let message = EmailMessage::new(user.email(), RESET_EMAIL_SUBJECT, body);
        if let Err(e) = self.notifier.send(message).await {
            warn!(user_id = %user.id(), error = %e, "Reset email delivery failed");

            user.clear_password_reset();
            if let Err(rollback) = self.users.update(&user).await {
                warn!(user_id = %user.id(), error = %rollback, "Failed to clear reset state");
            }

            return Err(DomainError::notifier(e.message()));
        }

        info!(user_id = %user.id(), "Password reset email sent");
        Ok(())
    }

    /// Consume a reset token, set the new password and sign the user in
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SessionGrant, DomainError> {
        let result = self
            .reset_password_inner(token, password, confirm_password)
            .await;
        record_account_event("reset_password", result.is_ok());
        result
    }

    async fn reset_password_inner(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SessionGrant, DomainError> {
        let token_hash = hash_reset_token(token);

        let mut user = self
            .users
            .get_by_reset_token(&token_hash, Utc::now())
            .await?
            .ok_or_else(|| DomainError::token(INVALID_RESET_TOKEN))?;

        if password != confirm_password {
            return Err(DomainError::validation(
                "Password and confirm password do not match",
            ));
        }

        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        user.set_password_hash(self.hasher.hash(password)?);
        user.clear_password_reset();
        let user = self.users.update(&user).await?;

        info!(user_id = %user.id(), "Password reset");

        let session = self.sessions.issue(&user)?;
        Ok(SessionGrant { user, session })
    }

    /// Check that the user store is reachable
    pub async fn check_store(&self) -> Result<(), DomainError> {
        self.users.count().await.map(|_| ())
    }

    async fn load(&self, user_id: &UserId) -> Result<User, DomainError> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    /// Best-effort removal of assets; failures are logged only
    async fn discard(&self, assets: &[&Asset]) {
        for asset in assets {
            if let Err(e) = self.media.destroy(&asset.external_id).await {
                warn!(external_id = %asset.external_id, error = %e, "Failed to remove asset");
            }
        }
    }
}
