use std::io;

use thiserror::Error;

use crate::modules::encryption::CryptoError;

/// Broad classification surfaced to transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself cannot be honoured (bad, orphaned or stale token)
    Validation,
    /// A collaborator failed; the request may succeed later
    Internal,
}

/// Failures from a user or token store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("encryption error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures from a password hasher
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("malformed password hash: {0}")]
    Malformed(String),
}

/// Failures from [`super::reset::ResetPasswordService::execute`]
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Token does not exist")]
    InvalidToken,
    #[error("User does not exist")]
    UserNotFound,
    #[error("Token expired")]
    TokenExpired,
    #[error("password hashing failed: {0}")]
    Hash(#[from] HashError),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ResetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResetError::InvalidToken | ResetError::UserNotFound | ResetError::TokenExpired => {
                ErrorCategory::Validation
            }
            ResetError::Hash(_) | ResetError::Store(_) => ErrorCategory::Internal,
        }
    }

    /// HTTP-style status a transport can hand back to the caller
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Validation => 400,
            ErrorCategory::Internal => 500,
        }
    }

    /// Stable machine-readable code for the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            ResetError::InvalidToken => "invalid_token",
            ResetError::UserNotFound => "user_not_found",
            ResetError::TokenExpired => "token_expired",
            ResetError::Hash(_) => "hash_failed",
            ResetError::Store(_) => "storage_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_failures_share_validation_category() {
        for error in [
            ResetError::InvalidToken,
            ResetError::UserNotFound,
            ResetError::TokenExpired,
        ] {
            assert_eq!(error.category(), ErrorCategory::Validation);
            assert_eq!(error.status_code(), 400);
        }
    }

    #[test]
    fn test_kinds_and_messages_are_distinct() {
        assert_eq!(ResetError::InvalidToken.kind(), "invalid_token");
        assert_eq!(ResetError::UserNotFound.kind(), "user_not_found");
        assert_eq!(ResetError::TokenExpired.kind(), "token_expired");

        assert_eq!(ResetError::InvalidToken.to_string(), "Token does not exist");
        assert_eq!(ResetError::UserNotFound.to_string(), "User does not exist");
        assert_eq!(ResetError::TokenExpired.to_string(), "Token expired");
    }

    #[test]
    fn test_collaborator_failures_are_internal() {
        let hash = ResetError::from(HashError::EmptyPassword);
        assert_eq!(hash.category(), ErrorCategory::Internal);
        assert_eq!(hash.kind(), "hash_failed");

        let store = ResetError::from(StoreError::Poisoned);
        assert_eq!(store.status_code(), 500);
        assert_eq!(store.kind(), "storage_failed");
    }
}
