use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::Path;

use mockable::Clock;

use crate::modules::auth::{RecoveryToken, StoreError, TokenStore};
use crate::modules::utils::clock::SharedClock;

use super::SealedFile;

type TokenDocument = HashMap<String, RecoveryToken>;

/// Durable token store backed by an encrypted JSON file.
///
/// `delete` removes under the file's exclusive lock, so exactly one handle
/// sees `true` for a given token, even across processes.
pub struct FileTokenStore {
    file: SealedFile,
    clock: SharedClock,
}

impl FileTokenStore {
    pub fn open(
        path: &Path,
        passphrase: &str,
        iterations: NonZeroU32,
        clock: SharedClock,
    ) -> Result<Self, StoreError> {
        let file = SealedFile::open(path, passphrase, iterations)?;
        file.read::<TokenDocument>()?;
        Ok(Self { file, clock })
    }
}

impl TokenStore for FileTokenStore {
    fn find_by_token(&self, token: &str) -> Result<Option<RecoveryToken>, StoreError> {
        Ok(self.file.read::<TokenDocument>()?.remove(token))
    }

    fn generate(&self, user_id: &str) -> Result<RecoveryToken, StoreError> {
        let recovery = RecoveryToken::new(user_id, self.clock.utc());
        self.file.update(|tokens: &mut TokenDocument| {
            tokens.insert(recovery.token.clone(), recovery.clone());
        })?;
        Ok(recovery)
    }

    fn delete(&self, token: &str) -> Result<bool, StoreError> {
        self.file
            .update(|tokens: &mut TokenDocument| tokens.remove(token).is_some())
    }
}
