//! User domain
//!
//! This module provides domain types and traits for portfolio accounts,
//! including the user entity, profile inputs, validation, and the repository trait.

mod entity;
mod profile;
mod repository;
mod validation;

pub use entity::{PasswordReset, User, UserId, UserRecord};
pub use profile::{ProfileUpdate, Registration};
pub use repository::UserRepository;
pub use validation::{
    describe_validation_errors, validate_password, validate_user_id, UserValidationError,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
