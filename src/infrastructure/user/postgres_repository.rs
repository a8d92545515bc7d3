//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::media::Asset;
use crate::domain::user::{PasswordReset, User, UserId, UserRecord, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = r#"
    id, full_name, email, phone, about_me, password_hash,
    portfolio_url, github_url, instagram_url, linkedin_url,
    avatar_id, avatar_url, resume_id, resume_url,
    reset_token_hash, reset_expires_at, created_at, updated_at
"#;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        bind: &str,
        context: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, clause);

        let row = sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to {}: {}", context, e)))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("id = $1", id.as_str(), "get user").await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("email = $1", email, "get user by email")
            .await
    }

    async fn get_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE reset_token_hash = $1 AND reset_expires_at > $2",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to get user by reset token: {}", e))
            })?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let reset = user.password_reset();

        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, phone, about_me, password_hash,
                               portfolio_url, github_url, instagram_url, linkedin_url,
                               avatar_id, avatar_url, resume_id, resume_url,
                               reset_token_hash, reset_expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.full_name())
        .bind(user.email())
        .bind(user.phone())
        .bind(user.about_me())
        .bind(user.password_hash())
        .bind(user.portfolio_url())
        .bind(user.github_url())
        .bind(user.instagram_url())
        .bind(user.linkedin_url())
        .bind(&user.avatar().external_id)
        .bind(&user.avatar().url)
        .bind(&user.resume().external_id)
        .bind(&user.resume().url)
        .bind(reset.map(|r| r.token_hash.as_str()))
        .bind(reset.map(|r| r.expires_at))
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user, "create"))?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let reset = user.password_reset();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, phone = $4, about_me = $5, password_hash = $6,
                portfolio_url = $7, github_url = $8, instagram_url = $9, linkedin_url = $10,
                avatar_id = $11, avatar_url = $12, resume_id = $13, resume_url = $14,
                reset_token_hash = $15, reset_expires_at = $16, updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.full_name())
        .bind(user.email())
        .bind(user.phone())
        .bind(user.about_me())
        .bind(user.password_hash())
        .bind(user.portfolio_url())
        .bind(user.github_url())
        .bind(user.instagram_url())
        .bind(user.linkedin_url())
        .bind(&user.avatar().external_id)
        .bind(&user.avatar().url)
        .bind(&user.resume().external_id)
        .bind(&user.resume().url)
        .bind(reset.map(|r| r.token_hash.as_str()))
        .bind(reset.map(|r| r.expires_at))
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id().as_str()
            )));
        }

        Ok(user.clone())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn map_write_error(e: sqlx::Error, user: &User, action: &str) -> DomainError {
    let msg = e.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        if msg.contains("email") {
            DomainError::conflict(format!("Email '{}' is already registered", user.email()))
        } else {
            DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id().as_str()
            ))
        }
    } else {
        DomainError::storage(format!("Failed to {} user: {}", action, e))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: String = row.get("id");
    let reset_token_hash: Option<String> = row.get("reset_token_hash");
    let reset_expires_at: Option<DateTime<Utc>> = row.get("reset_expires_at");

    let id = UserId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(User::from(UserRecord {
        id,
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        about_me: row.get("about_me"),
        password_hash: row.get("password_hash"),
        portfolio_url: row.get("portfolio_url"),
        github_url: row.get("github_url"),
        instagram_url: row.get("instagram_url"),
        linkedin_url: row.get("linkedin_url"),
        avatar: Asset::new(
            row.get::<String, _>("avatar_id"),
            row.get::<String, _>("avatar_url"),
        ),
        resume: Asset::new(
            row.get::<String, _>("resume_id"),
            row.get::<String, _>("resume_url"),
        ),
        password_reset: restore_reset(reset_token_hash, reset_expires_at),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

/// Both columns set means an open reset window; anything else is none
fn restore_reset(
    token_hash: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> Option<PasswordReset> {
    match (token_hash, expires_at) {
        (Some(hash), Some(expires_at)) => Some(PasswordReset::new(hash, expires_at)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_reset_requires_both_columns() {
        let now = Utc::now();

        assert!(restore_reset(Some("h".to_string()), Some(now)).is_some());
        assert!(restore_reset(Some("h".to_string()), None).is_none());
        assert!(restore_reset(None, Some(now)).is_none());
        assert!(restore_reset(None, None).is_none());
    }

    #[test]
    fn test_select_columns_cover_reset_state() {
        assert!(USER_COLUMNS.contains("reset_token_hash"));
        assert!(USER_COLUMNS.contains("reset_expires_at"));
        assert!(!USER_COLUMNS.contains('*'));
    }
}
