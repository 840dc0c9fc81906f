use block_modes::BlockMode;
use thiserror::Error;

use crate::Aes256Cbc;

/// Failures raised while sealing or opening encrypted payloads
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key or IV length")]
    InvalidKeyLength,
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8,
}

/// Function to encrypt data using AES-256-CBC
pub fn encrypt_data(data: &str, encryption_key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Cbc::new_from_slices(encryption_key, iv)
        .map_err(|_| CryptoError::InvalidKeyLength)?;
    Ok(cipher.encrypt_vec(data.as_bytes()))
}

/// Function to decrypt data using AES-256-CBC
pub fn decrypt_data(
    encrypted_data: &[u8],
    encryption_key: &[u8],
    iv: &[u8],
) -> Result<String, CryptoError> {
    let cipher = Aes256Cbc::new_from_slices(encryption_key, iv)
        .map_err(|_| CryptoError::InvalidKeyLength)?;
    let decrypted_data = cipher
        .decrypt_vec(encrypted_data)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    String::from_utf8(decrypted_data).map_err(|_| CryptoError::InvalidUtf8)
}
