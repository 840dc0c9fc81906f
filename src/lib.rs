use std::num::NonZeroU32;

// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, config, encryption, storage, utils};

// Re-export commonly used types
pub use modules::auth::{
    ErrorCategory, InMemoryTokenStore, InMemoryUserStore, PasswordHasher, Pbkdf2Hasher,
    RecoveryIssuer, RecoveryToken, ResetError, ResetPasswordRequest, ResetPasswordService,
    ResetPolicy, TokenStore, User, UserStore,
};
pub use modules::config::Settings;
pub use modules::storage::{FileTokenStore, FileUserStore};
pub use modules::utils::clock::{system_clock, ManualClock, SharedClock};

// Constants
pub const USERS_FILE: &str = "users.dat";
pub const TOKENS_FILE: &str = "recovery_tokens.dat";
pub const PASSPHRASE_ENV: &str = "RECOVERY_STORE_PASSPHRASE";
pub const DEFAULT_TOKEN_VALIDITY_MINUTES: u32 = 120;
pub const DEFAULT_KDF_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(iterations) => iterations,
    None => panic!("iteration count must be non-zero"),
};

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
pub type Aes256Cbc = block_modes::Cbc<aes::Aes256, block_modes::block_padding::Pkcs7>;
