use std::sync::Arc;

use super::errors::ResetError;
use super::store::UserStore;
use super::tokens::{RecoveryToken, TokenStore};
use crate::modules::utils::logging::log_reset_event;

/// Issues recovery tokens for users that exist
pub struct RecoveryIssuer {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
}

impl RecoveryIssuer {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { users, tokens }
    }

    pub fn issue(&self, user_id: &str) -> Result<RecoveryToken, ResetError> {
        if self.users.find_by_id(user_id)?.is_none() {
            log_reset_event("token_issue", user_id, false, Some("unknown user"));
            return Err(ResetError::UserNotFound);
        }
        let recovery = self.tokens.generate(user_id)?;
        log_reset_event("token_issue", user_id, true, None);
        Ok(recovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::store::{InMemoryUserStore, NewUser};
    use crate::modules::auth::tokens::InMemoryTokenStore;
    use crate::modules::utils::clock::system_clock;

    #[test]
    fn test_issue_for_known_user() {
        let users = Arc::new(InMemoryUserStore::new());
        let tokens = Arc::new(InMemoryTokenStore::new(system_clock()));
        let issuer = RecoveryIssuer::new(users.clone(), tokens.clone());
        let user = users
            .create(NewUser {
                name: "carlos".to_string(),
                email: "carlos@email.com".to_string(),
                password: "1234".to_string(),
            })
            .unwrap();

        let recovery = issuer.issue(&user.id).unwrap();

        assert_eq!(recovery.user_id, user.id);
        assert_eq!(tokens.find_by_token(&recovery.token).unwrap(), Some(recovery));
    }

    #[test]
    fn test_issue_for_unknown_user_is_rejected() {
        let users = Arc::new(InMemoryUserStore::new());
        let tokens = Arc::new(InMemoryTokenStore::new(system_clock()));
        let issuer = RecoveryIssuer::new(users, tokens);

        let result = issuer.issue("non-existing-user");
        assert!(matches!(result, Err(ResetError::UserNotFound)));
    }
}
