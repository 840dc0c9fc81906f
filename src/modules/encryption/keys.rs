use crate::HmacSha256;
use pbkdf2::pbkdf2;
use rand::Rng;
use std::num::NonZeroU32;

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Function to generate a random salt for PBKDF2
pub fn generate_random_salt() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN).map(|_| rng.gen()).collect()
}

/// Function to generate a random IV for AES encryption
pub fn generate_random_iv() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..IV_LEN).map(|_| rng.gen()).collect()
}

/// Derive a 32-byte key from a passphrase using PBKDF2-HMAC-SHA256.
///
/// Used to seal store files; credentials go through [`crate::auth::Pbkdf2Hasher`].
pub fn derive_key_from_passphrase(
    passphrase: &str,
    salt: &[u8],
    iterations: NonZeroU32,
) -> Vec<u8> {
    let mut key = vec![0u8; KEY_LEN];
    pbkdf2::<HmacSha256>(passphrase.as_bytes(), salt, iterations.get(), &mut key);
    key
}
