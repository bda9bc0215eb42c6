//! The auth provider seam and an in-process implementation.
//!
//! Passwords are stored only as Argon2id hashes. Hashing and verification
//! run on tokio's blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::mutate::new_id;

/// What a user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Session state of the current user.
#[async_trait]
pub trait Authenticate: Send + Sync {
    fn current_user(&self) -> Option<User>;
    async fn login(&self, email: &str, password: &str) -> Result<User>;
    async fn logout(&self);
}

struct Account {
    user: User,
    password_hash: String,
}

struct State {
    hasher: Argon2<'static>,
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<User>>,
}

/// Accounts held in memory with one session slot.
#[derive(Clone)]
pub struct InMemoryAuth {
    state: Arc<State>,
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::with_hasher(Argon2::default())
    }

    /// Uses `hasher` instead of the default Argon2id parameters.
    pub fn with_hasher(hasher: Argon2<'static>) -> Self {
        InMemoryAuth {
            state: Arc::new(State {
                hasher,
                accounts: RwLock::new(HashMap::new()),
                current: RwLock::new(None),
            }),
        }
    }

    /// Adds an account. Emails are case-insensitive and unique.
    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<User> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(CatalogError::invalid("email", "must be an email address"));
        }
        if password.is_empty() {
            return Err(CatalogError::invalid("password", "is required"));
        }
        if self.state.accounts.read().contains_key(&email) {
            return Err(CatalogError::invalid("email", "is already registered"));
        }

        let hasher = self.state.hasher.clone();
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| CatalogError::Backend(e.to_string()))?
        .map_err(|e| CatalogError::Backend(format!("password hashing failed: {e}")))?;

        let user = User {
            id: new_id(),
            email: email.clone(),
            role,
        };
        let mut accounts = self.state.accounts.write();
        if accounts.contains_key(&email) {
            return Err(CatalogError::invalid("email", "is already registered"));
        }
        accounts.insert(
            email,
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        info!(user = %user.id, role = ?user.role, "registered account");
        Ok(user)
    }
}

#[async_trait]
impl Authenticate for InMemoryAuth {
    fn current_user(&self) -> Option<User> {
        self.state.current.read().clone()
    }

    async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let Some((user, password_hash)) = self
            .state
            .accounts
            .read()
            .get(&email)
            .map(|a| (a.user.clone(), a.password_hash.clone()))
        else {
            debug!("login for unknown account");
            return Err(CatalogError::InvalidCredentials);
        };

        let hasher = self.state.hasher.clone();
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&password_hash)
                .map(|parsed| hasher.verify_password(password.as_bytes(), &parsed).is_ok())
                .unwrap_or(false)
        })
        .await
        .map_err(|e| CatalogError::Backend(e.to_string()))?;

        if !verified {
            debug!(user = %user.id, "login rejected");
            return Err(CatalogError::InvalidCredentials);
        }
        *self.state.current.write() = Some(user.clone());
        info!(user = %user.id, "logged in");
        Ok(user)
    }

    async fn logout(&self) {
        if let Some(user) = self.state.current.write().take() {
            info!(user = %user.id, "logged out");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use argon2::{Algorithm, Params, Version};

    /// Cheap parameters so tests do not spend seconds hashing.
    pub(crate) fn fast_auth() -> InMemoryAuth {
        let params = Params::new(256, 1, 1, None).unwrap();
        InMemoryAuth::with_hasher(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    #[tokio::test]
    async fn login_checks_password() {
        let auth = fast_auth();
        auth.register("Mod@Example.com", "hunter22", Role::Admin)
            .await
            .unwrap();

        assert_eq!(
            auth.login("mod@example.com", "wrong").await.unwrap_err(),
            CatalogError::InvalidCredentials
        );
        assert!(auth.current_user().is_none());

        let user = auth.login(" MOD@example.com ", "hunter22").await.unwrap();
        assert!(user.is_admin());
        assert_eq!(auth.current_user(), Some(user));

        auth.logout().await;
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn unknown_account_and_duplicates() {
        let auth = fast_auth();
        assert_eq!(
            auth.login("nobody@example.com", "x").await.unwrap_err(),
            CatalogError::InvalidCredentials
        );

        auth.register("a@example.com", "pw", Role::Member).await.unwrap();
        assert!(matches!(
            auth.register("A@example.com", "pw", Role::Member).await,
            Err(CatalogError::Invalid { field: "email", .. })
        ));
    }

    #[tokio::test]
    async fn stores_hashes_not_passwords() {
        let auth = fast_auth();
        auth.register("a@example.com", "plaintext", Role::Member)
            .await
            .unwrap();
        let accounts = auth.state.accounts.read();
        let hash = &accounts["a@example.com"].password_hash;
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("plaintext"));
    }

    #[tokio::test]
    async fn every_account_gets_its_own_salt() {
        let auth = fast_auth();
        auth.register("a@example.com", "same", Role::Member).await.unwrap();
        auth.register("b@example.com", "same", Role::Member).await.unwrap();

        let accounts = auth.state.accounts.read();
        let salt = |email: &str| {
            let hash = PasswordHash::new(&accounts[email].password_hash).unwrap();
            hash.salt.map(|s| s.as_str().to_string())
        };
        assert!(salt("a@example.com").is_some());
        assert_ne!(salt("a@example.com"), salt("b@example.com"));
    }
}
