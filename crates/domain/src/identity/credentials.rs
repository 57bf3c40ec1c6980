//! Credential hashing and password policy.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 7;

/// An opaque one-way credential hash (PHC string format).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wraps an already computed hash.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialHash([REDACTED])")
    }
}

/// One-way password hashing collaborator.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash(&self, password: &str) -> Result<CredentialHash, DomainError>;
}

/// Argon2id hasher with a random salt per password.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<CredentialHash, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| CredentialHash(hash.to_string()))
            .map_err(|e| DomainError::ValidationFailed(format!("password could not be hashed: {e}")))
    }
}

/// Rules a new password must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Checks a password and its confirmation.
    pub fn check(&self, password: &str, confirm_password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.min_length {
            return Err(DomainError::ValidationFailed(format!(
                "password must be at least {} characters",
                self.min_length
            )));
        }
        if password != confirm_password {
            return Err(DomainError::ValidationFailed(
                "password and confirmation do not match".to_string(),
            ));
        }
        Ok(())
    }
}
