//! Users, credentials and ownership of carts.

mod credentials;
mod service;
mod user;

pub use credentials::{
    Argon2Hasher, CredentialHash, CredentialHasher, MIN_PASSWORD_LENGTH, PasswordPolicy,
};
pub use service::IdentityService;
pub use user::{NewUser, User, UserId, Username};

pub(crate) use service::require_user;
