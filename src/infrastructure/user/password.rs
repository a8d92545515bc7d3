//! Argon2id password hashing

use std::fmt::Debug;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::domain::DomainError;

pub trait PasswordHasher: Send + Sync + Debug {
    /// Produce a salted PHC string
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// False for a wrong password and for hashes that cannot be parsed
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id hasher. Cost parameters are stored inside every hash, so
/// verification works across parameter changes.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit memory (KiB), iteration and lane costs
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                self.argon2()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::with_params(64, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_is_salted_argon2id() {
        let hasher = cheap();

        let first = hasher.hash("Secret123").unwrap();
        let second = hasher.hash("Secret123").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(hasher.verify("Secret123", &first));
        assert!(hasher.verify("Secret123", &second));
        assert!(!hasher.verify("Secret124", &first));
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let hash = cheap().hash("Secret123").unwrap();

        assert!(Argon2Hasher::new().verify("Secret123", &hash));
    }

    #[test]
    fn test_unparseable_hash_never_verifies() {
        let hasher = cheap();

        assert!(!hasher.verify("Secret123", "plain-text"));
        assert!(!hasher.verify("", ""));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let err = Argon2Hasher::with_params(1, 0, 0).unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
