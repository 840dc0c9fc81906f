use std::fs::{self, File, OpenOptions};
use std::io;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fd_lock::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::modules::auth::StoreError;
use crate::modules::encryption::keys::{IV_LEN, SALT_LEN};
use crate::modules::encryption::{
    decrypt_data, derive_key_from_passphrase, encrypt_data, generate_random_iv,
    generate_random_salt,
};

const HEADER_LEN: usize = SALT_LEN + IV_LEN;

struct SealingKey {
    salt: Vec<u8>,
    key: Vec<u8>,
}

/// A JSON document kept encrypted on disk.
///
/// Layout: 16-byte salt, 16-byte IV, AES-256-CBC ciphertext. Every access
/// takes an advisory lock on a sibling `.lock` file and re-reads the document,
/// so handles in other processes never overwrite each other's changes. The
/// key is re-derived only when the salt on disk differs from the cached one.
pub struct SealedFile {
    path: PathBuf,
    lock_path: PathBuf,
    passphrase: String,
    iterations: NonZeroU32,
    sealing: Mutex<SealingKey>,
}

impl SealedFile {
    /// Open `path`, reusing its salt if it exists
    pub fn open(path: &Path, passphrase: &str, iterations: NonZeroU32) -> Result<Self, StoreError> {
        let salt = match fs::read(path) {
            Ok(file_data) => header_salt(path, &file_data)?.to_vec(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => generate_random_salt(),
            Err(e) => return Err(e.into()),
        };
        let key = derive_key_from_passphrase(passphrase, &salt, iterations);

        Ok(Self {
            path: path.to_path_buf(),
            lock_path: path.with_extension("lock"),
            passphrase: passphrase.to_string(),
            iterations,
            sealing: Mutex::new(SealingKey { salt, key }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document under a shared lock
    pub fn read<T>(&self) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let lock = RwLock::new(self.open_lock_file()?);
        let _guard = lock.read()?;
        self.load()
    }

    /// Apply `change` to the current document and write it back, all under an
    /// exclusive lock. Nothing is written if loading fails.
    pub fn update<T, R, F>(&self, change: F) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> R,
    {
        let mut lock = RwLock::new(self.open_lock_file()?);
        let _guard = lock.write()?;
        let mut document: T = self.load()?;
        let outcome = change(&mut document);
        self.store(&document)?;
        Ok(outcome)
    }

    fn open_lock_file(&self) -> Result<File, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?)
    }

    /// Key matching `salt`, deriving and caching it when the file was
    /// created by another handle
    fn key_for(&self, salt: &[u8]) -> Result<Vec<u8>, StoreError> {
        let mut sealing = self.sealing.lock().map_err(|_| StoreError::Poisoned)?;
        if sealing.salt != salt {
            sealing.key = derive_key_from_passphrase(&self.passphrase, salt, self.iterations);
            sealing.salt = salt.to_vec();
        }
        Ok(sealing.key.clone())
    }

    fn load<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        let file_data = match fs::read(&self.path) {
            Ok(file_data) => file_data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        let key = self.key_for(header_salt(&self.path, &file_data)?)?;

        let iv = &file_data[SALT_LEN..HEADER_LEN];
        let json = decrypt_data(&file_data[HEADER_LEN..], &key, iv)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn store<T: Serialize + ?Sized>(&self, document: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(document)?;
        let iv = generate_random_iv();

        let mut file_data = Vec::with_capacity(HEADER_LEN + json.len() + IV_LEN);
        {
            let sealing = self.sealing.lock().map_err(|_| StoreError::Poisoned)?;
            let encrypted_data = encrypt_data(&json, &sealing.key, &iv)?;
            file_data.extend_from_slice(&sealing.salt);
            file_data.extend_from_slice(&iv);
            file_data.extend_from_slice(&encrypted_data);
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, &file_data)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

fn header_salt<'a>(path: &Path, file_data: &'a [u8]) -> Result<&'a [u8], StoreError> {
    if file_data.len() < HEADER_LEN {
        return Err(StoreError::Corrupt(format!(
            "{} is shorter than its header",
            path.display()
        )));
    }
    Ok(&file_data[..SALT_LEN])
}
