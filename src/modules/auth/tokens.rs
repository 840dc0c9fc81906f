use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::StoreError;
use crate::modules::utils::clock::SharedClock;

pub const TOKEN_LENGTH: usize = 32;

/// Recovery token bound to a user id
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecoveryToken {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl RecoveryToken {
    /// Issue a fresh token value for `user_id` stamped at `created_at`
    pub fn new(user_id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            token: generate_token_value(),
            user_id: user_id.to_string(),
            created_at,
        }
    }

    pub fn expires_at(&self, window: TimeDelta) -> DateTime<Utc> {
        self.created_at + window
    }

    /// Time since issuance; a creation time ahead of `now` counts as zero
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.created_at).max(TimeDelta::zero())
    }

    /// Expired only once strictly more than `window` has elapsed
    pub fn is_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        self.elapsed(now) > window
    }
}

/// Generate a cryptographically random alphanumeric token value
pub fn generate_token_value() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Persistence capability for recovery tokens
pub trait TokenStore: Send + Sync {
    fn find_by_token(&self, token: &str) -> Result<Option<RecoveryToken>, StoreError>;

    /// Issue and persist a token for `user_id`; the user is not checked
    fn generate(&self, user_id: &str) -> Result<RecoveryToken, StoreError>;

    /// Remove a token, reporting whether it existed
    fn delete(&self, token: &str) -> Result<bool, StoreError>;
}

/// Volatile token store used by tests and embedders
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, RecoveryToken>>,
    clock: SharedClock,
}

impl InMemoryTokenStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, RecoveryToken>>, StoreError> {
        self.tokens.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl TokenStore for InMemoryTokenStore {
    fn find_by_token(&self, token: &str) -> Result<Option<RecoveryToken>, StoreError> {
        Ok(self.lock()?.get(token).cloned())
    }

    fn generate(&self, user_id: &str) -> Result<RecoveryToken, StoreError> {
        let recovery = RecoveryToken::new(user_id, self.clock.utc());
        self.lock()?.insert(recovery.token.clone(), recovery.clone());
        Ok(recovery)
    }

    fn delete(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(token).is_some())
    }
}
