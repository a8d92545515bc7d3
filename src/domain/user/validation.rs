//! User validation utilities

use thiserror::Error;
use validator::ValidationErrors;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("User ID must start with a letter or number")]
    InvalidIdStart,

    #[error("User ID must end with a letter or number")]
    InvalidIdEnd,

    #[error("User ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidIdCharacter(char),

    #[error("User ID cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_USER_ID_LENGTH: usize = 64;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a user ID: 1 to 64 ASCII letters, digits and single hyphens,
/// starting and ending with a letter or digit
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    let (Some(first), Some(last)) = (id.chars().next(), id.chars().last()) else {
        return Err(UserValidationError::EmptyId);
    };

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }
    if !first.is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdStart);
    }
    if !last.is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdEnd);
    }
    if let Some(c) = id.chars().find(|c| *c != '-' && !c.is_ascii_alphanumeric()) {
        return Err(UserValidationError::InvalidIdCharacter(c));
    }
    if id.contains("--") {
        return Err(UserValidationError::ConsecutiveHyphens);
    }

    Ok(())
}

/// Password length must be within 8..=128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Flatten `validator` errors into a single, stable message.
///
/// Fields are sorted so the same input always yields the same text.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for '{}'", field),
            })
        })
        .collect();

    parts.sort();
    parts.dedup();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_valid_user_ids() {
        assert!(validate_user_id("admin").is_ok());
        assert!(validate_user_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_user_id("66c6176305390e8968546838").is_ok());
    }

    #[test]
    fn test_empty_user_id() {
        assert_eq!(validate_user_id(""), Err(UserValidationError::EmptyId));
    }

    #[test]
    fn test_user_id_too_long() {
        let long_id = "a".repeat(65);
        assert_eq!(
            validate_user_id(&long_id),
            Err(UserValidationError::IdTooLong(64))
        );
    }

    #[test]
    fn test_user_id_invalid_edges() {
        assert_eq!(
            validate_user_id("-user"),
            Err(UserValidationError::InvalidIdStart)
        );
        assert_eq!(
            validate_user_id("user-"),
            Err(UserValidationError::InvalidIdEnd)
        );
    }

    #[test]
    fn test_user_id_invalid_character() {
        assert_eq!(
            validate_user_id("user_name"),
            Err(UserValidationError::InvalidIdCharacter('_'))
        );
        assert_eq!(
            validate_user_id("user--name"),
            Err(UserValidationError::ConsecutiveHyphens)
        );
    }

    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_password_length_bounds() {
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
        assert_eq!(
            validate_password(&"a".repeat(129)),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[derive(Validate)]
    struct Contact {
        #[validate(email(message = "Please provide a valid email"))]
        email: String,
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_describe_validation_errors() {
        let contact = Contact {
            email: "nope".to_string(),
            name: String::new(),
        };

        let errors = contact.validate().unwrap_err();
        let message = describe_validation_errors(&errors);

        assert!(message.contains("Please provide a valid email"));
        assert!(message.contains("Invalid value for 'name'"));
    }
}
