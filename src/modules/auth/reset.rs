use std::fmt;
use std::sync::Arc;

use chrono::TimeDelta;
use log::warn;
use mockable::Clock;

use super::errors::ResetError;
use super::password::PasswordHasher;
use super::store::UserStore;
use super::tokens::TokenStore;
use crate::modules::utils::clock::SharedClock;
use crate::modules::utils::logging::{log_reset_event, mask_sensitive};
use crate::DEFAULT_TOKEN_VALIDITY_MINUTES;

/// Rules applied when a token is redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPolicy {
    /// Longest time after issuance that a token is still accepted
    pub validity_window: TimeDelta,
    /// Delete the token once the new password has been stored
    pub single_use: bool,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self {
            validity_window: TimeDelta::minutes(i64::from(DEFAULT_TOKEN_VALIDITY_MINUTES)),
            single_use: true,
        }
    }
}

/// Token plus the new plaintext password
#[derive(Clone)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("token", &mask_sensitive(&self.token))
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Exchanges a recovery token for a new password.
///
/// Each call validates the token, checks expiry and hashes the new password
/// before touching either store. Under a single-use policy the token is then
/// claimed through [`TokenStore::delete`]; only the caller whose delete
/// removed it goes on to write the user, so concurrent redemptions of one
/// token cannot both succeed.
pub struct ResetPasswordService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: SharedClock,
    policy: ResetPolicy,
}

impl ResetPasswordService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: SharedClock,
        policy: ResetPolicy,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    pub fn execute(&self, request: ResetPasswordRequest) -> Result<(), ResetError> {
        let result = self.reset(&request);
        match &result {
            Ok(user_id) => log_reset_event(
                "password_reset",
                user_id,
                true,
                Some("password replaced"),
            ),
            Err(e) => log_reset_event(
                "password_reset",
                &request.token,
                false,
                Some(e.kind()),
            ),
        }
        result.map(|_| ())
    }

    fn reset(&self, request: &ResetPasswordRequest) -> Result<String, ResetError> {
        let recovery = self
            .tokens
            .find_by_token(&request.token)?
            .ok_or(ResetError::InvalidToken)?;

        let mut user = self
            .users
            .find_by_id(&recovery.user_id)?
            .ok_or(ResetError::UserNotFound)?;

        if recovery.is_expired(self.clock.utc(), self.policy.validity_window) {
            return Err(ResetError::TokenExpired);
        }

        user.password = self.hasher.hash(&request.password)?;

        // Losing the claim means another redemption already consumed the token
        if self.policy.single_use && !self.tokens.delete(&recovery.token)? {
            return Err(ResetError::InvalidToken);
        }

        match self.users.save(user) {
            Ok(user) => Ok(user.id),
            Err(e) => {
                if self.policy.single_use {
                    warn!(
                        "Recovery token {} was consumed but the password was not saved",
                        mask_sensitive(&recovery.token)
                    );
                }
                Err(e.into())
            }
        }
    }
}
