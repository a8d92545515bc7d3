//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::{ProfileUpdate, Registration};
use super::validation::{validate_user_id, UserValidationError};
use crate::domain::media::Asset;

/// User identifier - alphanumeric + hyphens, max 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An outstanding password reset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    /// SHA-256 hex digest of the token that was emailed
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(token_hash: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_hash: token_hash.into(),
            expires_at,
        }
    }

    /// A reset can be consumed only while its expiry is strictly in the future
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Account owning a portfolio profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    full_name: String,
    email: String,
    phone: String,
    about_me: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(rename = "portfolioURL", skip_serializing_if = "Option::is_none")]
    portfolio_url: Option<String>,
    #[serde(rename = "githubURL", skip_serializing_if = "Option::is_none")]
    github_url: Option<String>,
    #[serde(rename = "instagramURL", skip_serializing_if = "Option::is_none")]
    instagram_url: Option<String>,
    #[serde(rename = "linkedInURL", skip_serializing_if = "Option::is_none")]
    linkedin_url: Option<String>,
    avatar: Asset,
    resume: Asset,
    #[serde(skip_serializing)]
    password_reset: Option<PasswordReset>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Flat representation used by storage backends to rebuild a `User`
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub about_me: String,
    pub password_hash: String,
    pub portfolio_url: Option<String>,
    pub github_url: Option<String>,
    pub instagram_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub avatar: Asset,
    pub resume: Asset,
    pub password_reset: Option<PasswordReset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            full_name: record.full_name,
            email: record.email,
            phone: record.phone,
            about_me: record.about_me,
            password_hash: record.password_hash,
            portfolio_url: record.portfolio_url,
            github_url: record.github_url,
            instagram_url: record.instagram_url,
            linkedin_url: record.linkedin_url,
            avatar: record.avatar,
            resume: record.resume,
            password_reset: record.password_reset,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl User {
    /// Create a new user from a validated registration
    pub fn new(
        id: UserId,
        registration: &Registration,
        password_hash: impl Into<String>,
        avatar: Asset,
        resume: Asset,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            full_name: registration.full_name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            about_me: registration.about_me.clone(),
            password_hash: password_hash.into(),
            portfolio_url: registration.portfolio_url.clone(),
            github_url: registration.github_url.clone(),
            instagram_url: registration.instagram_url.clone(),
            linkedin_url: registration.linkedin_url.clone(),
            avatar,
            resume,
            password_reset: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn about_me(&self) -> &str {
        &self.about_me
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn portfolio_url(&self) -> Option<&str> {
        self.portfolio_url.as_deref()
    }

    pub fn github_url(&self) -> Option<&str> {
        self.github_url.as_deref()
    }

    pub fn instagram_url(&self) -> Option<&str> {
        self.instagram_url.as_deref()
    }

    pub fn linkedin_url(&self) -> Option<&str> {
        self.linkedin_url.as_deref()
    }

    pub fn avatar(&self) -> &Asset {
        &self.avatar
    }

    pub fn resume(&self) -> &Asset {
        &self.resume
    }

    pub fn password_reset(&self) -> Option<&PasswordReset> {
        self.password_reset.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Apply the provided fields of a profile update, leaving the rest untouched
    pub fn apply_profile_update(&mut self, update: ProfileUpdate) {
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(about_me) = update.about_me {
            self.about_me = about_me;
        }
        if update.portfolio_url.is_some() {
            self.portfolio_url = update.portfolio_url;
        }
        if update.github_url.is_some() {
            self.github_url = update.github_url;
        }
        if update.instagram_url.is_some() {
            self.instagram_url = update.instagram_url;
        }
        if update.linkedin_url.is_some() {
            self.linkedin_url = update.linkedin_url;
        }
        self.touch();
    }

    /// Replace the avatar reference, returning the previous one
    pub fn replace_avatar(&mut self, avatar: Asset) -> Asset {
        let previous = std::mem::replace(&mut self.avatar, avatar);
        self.touch();
        previous
    }

    /// Replace the resume reference, returning the previous one
    pub fn replace_resume(&mut self, resume: Asset) -> Asset {
        let previous = std::mem::replace(&mut self.resume, resume);
        self.touch();
        previous
    }

    /// Update the password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    /// Open a reset window, replacing any earlier one
    pub fn begin_password_reset(&mut self, reset: PasswordReset) {
        self.password_reset = Some(reset);
        self.touch();
    }

    /// Drop any outstanding reset window
    pub fn clear_password_reset(&mut self) {
        self.password_reset = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn registration() -> Registration {
        Registration {
            full_name: "Ada Lovelace".to_string(),
            email: "a@x.com".to_string(),
            phone: "555-0100".to_string(),
            about_me: "Analyst".to_string(),
            password: "Secret123".to_string(),
            github_url: Some("https://github.com/ada".to_string()),
            ..Default::default()
        }
    }

    fn create_test_user() -> User {
        User::new(
            UserId::new("user-1").unwrap(),
            &registration(),
            "hashed_password",
            Asset::new("AVATARS/a1", "https://cdn.test/a1.png"),
            Asset::new("RESUME/r1", "https://cdn.test/r1.pdf"),
        )
    }

    #[test]
    fn test_user_id_generate_is_valid() {
        let id = UserId::generate();
        assert!(UserId::new(id.as_str()).is_ok());
        assert_ne!(UserId::generate(), id);
    }

    #[test]
    fn test_user_id_invalid() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("-user").is_err());
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user();

        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.email(), "a@x.com");
        assert_eq!(user.password_hash(), "hashed_password");
        assert_eq!(user.github_url(), Some("https://github.com/ada"));
        assert!(user.portfolio_url().is_none());
        assert_eq!(user.avatar().external_id, "AVATARS/a1");
        assert_eq!(user.resume().external_id, "RESUME/r1");
        assert!(user.password_reset().is_none());
    }

    #[test]
    fn test_profile_update_only_touches_provided_fields() {
        let mut user = create_test_user();

        user.apply_profile_update(ProfileUpdate {
            phone: Some("555-0199".to_string()),
            linkedin_url: Some("https://linkedin.com/in/ada".to_string()),
            ..Default::default()
        });

        assert_eq!(user.phone(), "555-0199");
        assert_eq!(user.linkedin_url(), Some("https://linkedin.com/in/ada"));
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.github_url(), Some("https://github.com/ada"));
    }

    #[test]
    fn test_replace_assets_returns_previous() {
        let mut user = create_test_user();

        let old = user.replace_avatar(Asset::new("AVATARS/a2", "https://cdn.test/a2.png"));
        assert_eq!(old.external_id, "AVATARS/a1");
        assert_eq!(user.avatar().external_id, "AVATARS/a2");

        let old = user.replace_resume(Asset::new("RESUME/r2", "https://cdn.test/r2.pdf"));
        assert_eq!(old.external_id, "RESUME/r1");
        assert_eq!(user.resume().external_id, "RESUME/r2");
    }

    #[test]
    fn test_password_reset_window() {
        let now = Utc::now();
        let reset = PasswordReset::new("abc", now + Duration::minutes(15));

        assert!(reset.is_valid_at(now));
        assert!(!reset.is_valid_at(now + Duration::minutes(15)));
        assert!(!reset.is_valid_at(now + Duration::minutes(16)));
    }

    #[test]
    fn test_begin_and_clear_reset() {
        let mut user = create_test_user();

        user.begin_password_reset(PasswordReset::new("hash", Utc::now()));
        assert_eq!(user.password_reset().unwrap().token_hash, "hash");

        user.clear_password_reset();
        assert!(user.password_reset().is_none());
    }

    #[test]
    fn test_user_update_password() {
        let mut user = create_test_user();
        let original_updated = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(10));

        user.set_password_hash("new_hash");
        assert_eq!(user.password_hash(), "new_hash");
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_user_serialization_excludes_secrets() {
        let mut user = create_test_user();
        user.begin_password_reset(PasswordReset::new("reset_digest", Utc::now()));

        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["githubURL"], "https://github.com/ada");
        assert_eq!(json["avatar"]["externalId"], "AVATARS/a1");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("passwordReset").is_none());

        let text = json.to_string();
        assert!(!text.contains("hashed_password"));
        assert!(!text.contains("reset_digest"));
    }
}
