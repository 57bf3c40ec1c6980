//! User registration and lookup.

use record_store::{RecordStore, StoreError};

use crate::cart::Cart;
use crate::entity::EntityStore;
use crate::error::DomainError;

use super::{Argon2Hasher, CredentialHasher, NewUser, PasswordPolicy, User, UserId, Username};

/// Service for registering and resolving users.
pub struct IdentityService<S: RecordStore, H: CredentialHasher = Argon2Hasher> {
    entities: EntityStore<S>,
    hasher: H,
    policy: PasswordPolicy,
}

impl<S: RecordStore, H: CredentialHasher> IdentityService<S, H> {
    /// Creates a new identity service with the given store and hasher.
    pub fn new(store: S, hasher: H) -> Self {
        Self {
            entities: EntityStore::new(store),
            hasher,
            policy: PasswordPolicy::default(),
        }
    }

    /// Replaces the password policy.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Looks up a user by exact username.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.entities.find_by_key(username).await
    }

    /// Looks up a user by ID.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, DomainError> {
        self.entities.get(user_id).await
    }

    /// Registers a user together with an empty cart.
    ///
    /// The user and the cart are committed in one write; a username claimed
    /// by a concurrent registration is reported as `UsernameTaken`.
    #[tracing::instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let username = Username::parse(new_user.username)?;
        self.policy
            .check(&new_user.password, &new_user.confirm_password)
            .inspect_err(|e| tracing::warn!(error = %e, "Registration rejected"))?;

        if self
            .entities
            .find_by_key::<User>(username.as_str())
            .await?
            .is_some()
        {
            tracing::warn!("Username already taken");
            return Err(DomainError::UsernameTaken(username.to_string()));
        }

        let password_hash = self.hasher.hash(&new_user.password)?;
        let user_id = UserId::new();
        let mut cart = Cart::new(user_id);
        let mut user = User::new(user_id, username, password_hash, cart.id());

        match self.entities.save_pair(&mut user, &mut cart).await {
            Ok(()) => {}
            Err(DomainError::Storage(StoreError::DuplicateKey { .. })) => {
                tracing::warn!("Username claimed by a concurrent registration");
                return Err(DomainError::UsernameTaken(user.username().to_string()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save user");
                return Err(e);
            }
        }

        metrics::counter!("users_created_total").increment(1);
        tracing::info!(user_id = %user.id(), cart_id = %cart.id(), "User created");
        Ok(user)
    }
}

/// Resolves a username to its user, failing with `NotFound`.
pub(crate) async fn require_user<S: RecordStore>(
    entities: &EntityStore<S>,
    username: &str,
) -> Result<User, DomainError> {
    match entities.find_by_key::<User>(username).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!(username, "User not found");
            Err(DomainError::not_found("user", username))
        }
    }
}
