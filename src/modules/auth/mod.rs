pub mod errors;
pub mod issuer;
pub mod password;
pub mod reset;
pub mod store;
pub mod tokens;

// Re-export the main types and functions
pub use errors::{ErrorCategory, HashError, ResetError, StoreError};
pub use issuer::RecoveryIssuer;
pub use password::{validate_password, PasswordError, PasswordHasher, Pbkdf2Hasher};
pub use reset::{ResetPasswordRequest, ResetPasswordService, ResetPolicy};
pub use store::{InMemoryUserStore, NewUser, User, UserStore};
pub use tokens::{InMemoryTokenStore, RecoveryToken, TokenStore};
