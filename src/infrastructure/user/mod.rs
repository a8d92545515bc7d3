//! User infrastructure module
//!
//! Password hashing with Argon2, reset tokens, the in-memory and PostgreSQL
//! user stores, and the account service tying them to media and email.

mod password;
mod postgres_repository;
mod repository;
mod reset_token;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use reset_token::{hash_reset_token, ResetToken};
pub use service::{
    AccountService, AccountSettings, PasswordChange, ProfileFiles, SessionGrant,
    RESET_EMAIL_SUBJECT,
};
