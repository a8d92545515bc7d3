//! Session issuance
//!
//! A session is a signed token plus the cookie directives that carry it.
//! Nothing here touches HTTP types; the API layer turns a [`SessionCookie`]
//! into a `Set-Cookie` header.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::jwt::{JwtClaims, JwtGenerator};
use crate::domain::user::User;
use crate::domain::DomainError;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE_NAME: &str = "token";

/// Cookie settings for issued sessions
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub expire_days: u32,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            expire_days: 7,
            secure: false,
        }
    }
}

/// Cookie directives for a session (or for clearing one)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: &'static str,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub max_age_secs: i64,
    pub http_only: bool,
    pub secure: bool,
}

impl SessionCookie {
    /// Directives that make the client drop the session cookie.
    ///
    /// Uses the Unix epoch so repeated logouts produce identical headers.
    pub fn cleared() -> Self {
        Self {
            name: SESSION_COOKIE_NAME,
            value: String::new(),
            expires: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
            max_age_secs: 0,
            http_only: true,
            secure: false,
        }
    }

    /// Render as a `Set-Cookie` header value
    pub fn header_value(&self) -> String {
        let mut value = format!(
            "{}={}; Path=/; Expires={}; Max-Age={}; SameSite=Lax",
            self.name,
            self.value,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.max_age_secs,
        );

        if self.http_only {
            value.push_str("; HttpOnly");
        }
        if self.secure {
            value.push_str("; Secure");
        }

        value
    }
}

/// An issued session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub cookie: SessionCookie,
}

/// Issues and verifies session tokens
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    jwt: Arc<dyn JwtGenerator>,
    cookie: CookieConfig,
}

impl SessionIssuer {
    pub fn new(jwt: Arc<dyn JwtGenerator>, cookie: CookieConfig) -> Self {
        Self { jwt, cookie }
    }

    /// Issue a session for a user
    pub fn issue(&self, user: &User) -> Result<Session, DomainError> {
        let token = self.jwt.generate(user)?;
        let lifetime = Duration::days(i64::from(self.cookie.expire_days));

        let cookie = SessionCookie {
            name: SESSION_COOKIE_NAME,
            value: token.clone(),
            expires: Utc::now() + lifetime,
            max_age_secs: lifetime.num_seconds(),
            http_only: true,
            secure: self.cookie.secure,
        };

        Ok(Session { token, cookie })
    }

    /// Verify a presented token
    pub fn verify(&self, token: &str) -> Result<JwtClaims, DomainError> {
        self.jwt.validate(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::Asset;
    use crate::domain::user::{Registration, UserId};
    use crate::infrastructure::auth::jwt::{JwtConfig, JwtService};

    fn issuer(secure: bool) -> SessionIssuer {
        let jwt = Arc::new(JwtService::new(JwtConfig::new("secret", 24)));
        SessionIssuer::new(
            jwt,
            CookieConfig {
                expire_days: 7,
                secure,
            },
        )
    }

    fn user() -> User {
        let registration = Registration {
            full_name: "Ada".to_string(),
            email: "a@x.com".to_string(),
            phone: "1".to_string(),
            about_me: "x".to_string(),
            password: "Secret123".to_string(),
            ..Default::default()
        };
        User::new(
            UserId::new("user-1").unwrap(),
            &registration,
            "hash",
            Asset::new("a", "https://cdn.test/a"),
            Asset::new("r", "https://cdn.test/r"),
        )
    }

    #[test]
    fn test_issue_session() {
        let issuer = issuer(false);
        let session = issuer.issue(&user()).unwrap();

        assert_eq!(session.cookie.value, session.token);
        assert_eq!(session.cookie.max_age_secs, 7 * 24 * 3600);
        assert!(session.cookie.http_only);

        let claims = issuer.verify(&session.token).unwrap();
        assert_eq!(claims.user_id(), "user-1");
    }

    #[test]
    fn test_cookie_header() {
        let session = issuer(true).issue(&user()).unwrap();
        let header = session.cookie.header_value();

        assert!(header.starts_with(&format!("token={};", session.token)));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("Path=/"));
    }

    #[test]
    fn test_cleared_cookie_is_stable() {
        let first = SessionCookie::cleared().header_value();
        let second = SessionCookie::cleared().header_value();

        assert_eq!(first, second);
        assert_eq!(
            first,
            "token=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; SameSite=Lax; HttpOnly"
        );
    }
}
