//! Password reset tokens
//!
//! The raw token is emailed to the user; only its SHA-256 digest is stored.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a raw token (hex encoded to 40 characters)
const TOKEN_BYTES: usize = 20;

/// Freshly generated reset token
#[derive(Clone)]
pub struct ResetToken {
    raw: String,
    hash: String,
}

impl ResetToken {
    /// Generate a new random token
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let raw = hex::encode(bytes);
        let hash = hash_reset_token(&raw);

        Self { raw, hash }
    }

    /// Value to send to the user
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Value to persist
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("raw", &"[hidden]")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Deterministic one-way digest of a raw token, lowercase hex
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
