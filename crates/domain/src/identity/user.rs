//! User types.

use common::typed_id;
use record_store::Version;
use serde::{Deserialize, Serialize};

use crate::cart::CartId;
use crate::entity::Entity;
use crate::error::DomainError;

use super::CredentialHash;

typed_id!(
    /// Unique identifier for a user.
    UserId
);

/// A case-sensitive, non-blank username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Parses a username, rejecting blank input.
    pub fn parse(username: impl Into<String>) -> Result<Self, DomainError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "username must not be empty".to_string(),
            ));
        }
        Ok(Self(username))
    }

    /// Returns the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A registered user. Owns exactly one cart for its whole lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: CredentialHash,
    cart_id: CartId,

    #[serde(skip)]
    version: Version,
}

impl User {
    pub(crate) fn new(
        id: UserId,
        username: Username,
        password_hash: CredentialHash,
        cart_id: CartId,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            cart_id,
            version: Version::initial(),
        }
    }

    /// Returns the user ID.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the stored credential hash.
    pub fn password_hash(&self) -> &CredentialHash {
        &self.password_hash
    }

    /// Returns the ID of the user's cart.
    pub fn cart_id(&self) -> CartId {
        self.cart_id
    }
}

impl Entity for User {
    type Id = UserId;

    fn kind() -> &'static str {
        "user"
    }

    fn id(&self) -> UserId {
        self.id
    }

    fn key(&self) -> Option<String> {
        Some(self.username.0.clone())
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

/// Registration input.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl NewUser {
    /// Creates a registration request.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}
