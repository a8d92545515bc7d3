//! Authentication infrastructure

mod jwt;
mod session;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
pub use session::{CookieConfig, Session, SessionCookie, SessionIssuer, SESSION_COOKIE_NAME};
