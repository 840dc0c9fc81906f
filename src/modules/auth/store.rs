use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::StoreError;

/// A user account as seen by the reset flow
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String, // Hashed credential, replaced wholesale on reset
}

/// Input for creating a user; `password` is stored as given
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub fn from_new(id: String, new_user: NewUser) -> Self {
        Self {
            id,
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
        }
    }
}

/// Generate an opaque user id (16 random bytes, hex encoded)
pub fn generate_user_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Persistence capability for user records
pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Upsert the full record keyed by `user.id`
    fn save(&self, user: User) -> Result<User, StoreError>;

    fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.save(User::from_new(generate_user_id(), new_user))
    }
}

/// Volatile store used by tests and embedders
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, User>>, StoreError> {
        self.users.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn save(&self, user: User) -> Result<User, StoreError> {
        self.lock()?.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}
