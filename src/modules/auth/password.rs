use std::io;
use std::num::NonZeroU32;

use pbkdf2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use pbkdf2::{Params, Pbkdf2};
use rand::rngs::OsRng;

use super::errors::HashError;
use crate::encryption::keys::KEY_LEN;
use crate::DEFAULT_KDF_ITERATIONS;

/// Password management struct
#[derive(Debug)]
pub enum PasswordError {
    TooShort,
    NoUppercase,
    NoLowercase,
    NoNumber,
    NoSpecialChar,
}

/// Function to validate password strength
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < 8 {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordError::NoUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordError::NoLowercase);
    }
    if !password.chars().any(|c| c.is_numeric()) {
        return Err(PasswordError::NoNumber);
    }
    if !password
        .chars()
        .any(|c| "!@#$%^&*()_+-=[]{}|;:,.<>?".contains(c))
    {
        return Err(PasswordError::NoSpecialChar);
    }
    Ok(())
}

/// Helper function to read a password securely
pub fn read_password() -> io::Result<String> {
    rpassword::read_password()
}

/// One-way transform from plaintext to stored credential
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, HashError>;
}

/// PBKDF2-HMAC-SHA256 with a fresh salt per hash.
///
/// Hashes are PHC strings (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`), so
/// the round count travels with each credential and can be raised later.
#[derive(Debug, Clone)]
pub struct Pbkdf2Hasher {
    iterations: NonZeroU32,
}

impl Pbkdf2Hasher {
    pub fn new(iterations: NonZeroU32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> NonZeroU32 {
        self.iterations
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new(DEFAULT_KDF_ITERATIONS)
    }
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.is_empty() {
            return Err(HashError::EmptyPassword);
        }
        let salt = SaltString::generate(&mut OsRng);
        let params = Params {
            rounds: self.iterations.get(),
            output_length: KEY_LEN,
        };
        let hashed = Pbkdf2
            .hash_password_customized(plaintext.as_bytes(), None, None, params, salt.as_salt())
            .map_err(|e| HashError::Malformed(e.to_string()))?;
        Ok(hashed.to_string())
    }

    fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(hashed).map_err(|e| HashError::Malformed(e.to_string()))?;
        match Pbkdf2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(HashError::Malformed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounds(count: u32) -> NonZeroU32 {
        NonZeroU32::new(count).unwrap()
    }

    fn fast_hasher() -> Pbkdf2Hasher {
        Pbkdf2Hasher::new(rounds(1_000))
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("Password123!").is_ok());

        assert!(matches!(
            validate_password("Pass1!"),
            Err(PasswordError::TooShort)
        ));
        assert!(matches!(
            validate_password("password123!"),
            Err(PasswordError::NoUppercase)
        ));
        assert!(matches!(
            validate_password("PASSWORD123!"),
            Err(PasswordError::NoLowercase)
        ));
        assert!(matches!(
            validate_password("Password!"),
            Err(PasswordError::NoNumber)
        ));
        assert!(matches!(
            validate_password("Password123"),
            Err(PasswordError::NoSpecialChar)
        ));
    }

    #[test]
    fn test_hash_verifies_only_original_password() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("123456").unwrap();

        assert!(hashed.starts_with("$pbkdf2-sha256$i=1000,l=32$"));
        assert_ne!(hashed, "123456");
        assert!(hasher.verify("123456", &hashed).unwrap());
        assert!(!hasher.verify("1234", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("123456").unwrap();
        let second = hasher.hash("123456").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_uses_encoded_iterations() {
        let hashed = Pbkdf2Hasher::new(rounds(500)).hash("123456").unwrap();
        assert!(fast_hasher().verify("123456", &hashed).unwrap());
    }

    #[test]
    fn test_empty_password_is_rejected() {
        assert_eq!(fast_hasher().hash(""), Err(HashError::EmptyPassword));
    }

    #[test]
    fn test_malformed_hashes_are_rejected() {
        let hasher = fast_hasher();
        for hashed in [
            "123456",
            "pbkdf2-sha256$1000$00$00",
            "$pbkdf2-sha256$i=many,l=32$c2FsdHNhbHRzYWx0$aGFzaA",
            "$argon2id$v=19$m=16,t=2,p=1$c2FsdHNhbHRzYWx0$aGFzaGhhc2hoYXNoaGFzaA",
        ] {
            assert!(
                matches!(hasher.verify("123456", hashed), Err(HashError::Malformed(_))),
                "{} should be malformed",
                hashed
            );
        }
    }

    #[test]
    fn test_hash_parses_as_phc_string() {
        let hashed = fast_hasher().hash("123456").unwrap();
        let parsed = PasswordHash::new(&hashed).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "pbkdf2-sha256");
        assert_eq!(parsed.hash.as_ref().map(|output| output.len()), Some(KEY_LEN));
    }

    #[test]
    fn test_zero_rounds_cannot_be_configured() {
        assert!(NonZeroU32::new(0).is_none());
        assert_eq!(Pbkdf2Hasher::default().iterations(), DEFAULT_KDF_ITERATIONS);
        assert_eq!(fast_hasher().iterations().get(), 1_000);
    }
}
