use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::Path;

use crate::modules::auth::{StoreError, User, UserStore};

use super::SealedFile;

type UserDocument = HashMap<String, User>;

/// Durable user store backed by an encrypted JSON file.
///
/// Holds no copy of the records; every call goes through the file so other
/// handles on the same path see each other's writes.
pub struct FileUserStore {
    file: SealedFile,
}

impl FileUserStore {
    /// Open the store, failing early on a wrong passphrase or corrupt file
    pub fn open(path: &Path, passphrase: &str, iterations: NonZeroU32) -> Result<Self, StoreError> {
        let file = SealedFile::open(path, passphrase, iterations)?;
        file.read::<UserDocument>()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl UserStore for FileUserStore {
    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.file.read::<UserDocument>()?.remove(id))
    }

    fn save(&self, user: User) -> Result<User, StoreError> {
        self.file.update(|users: &mut UserDocument| {
            users.insert(user.id.clone(), user.clone());
        })?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::NewUser;
    use tempfile::TempDir;

    fn rounds() -> NonZeroU32 {
        NonZeroU32::new(1_000).unwrap()
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@email.com", name),
            password: "1234".to_string(),
        }
    }

    #[test]
    fn test_users_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.dat");

        let store = FileUserStore::open(&path, "secret", rounds()).unwrap();
        let mut user = store.create(new_user("carlos")).unwrap();
        user.password = "123456".to_string();
        store.save(user.clone()).unwrap();
        drop(store);

        let reopened = FileUserStore::open(&path, "secret", rounds()).unwrap();
        assert_eq!(reopened.find_by_id(&user.id).unwrap(), Some(user));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_two_handles_keep_each_others_users() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.dat");
        let resetting = FileUserStore::open(&path, "secret", rounds()).unwrap();
        let other = FileUserStore::open(&path, "secret", rounds()).unwrap();

        let ana = other.create(new_user("ana")).unwrap();
        let carlos = resetting.create(new_user("carlos")).unwrap();

        // Each handle sees the other's write without reopening
        assert_eq!(resetting.find_by_id(&ana.id).unwrap(), Some(ana.clone()));
        assert_eq!(other.find_by_id(&carlos.id).unwrap(), Some(carlos.clone()));

        let reopened = FileUserStore::open(&path, "secret", rounds()).unwrap();
        assert_eq!(reopened.find_by_id(&ana.id).unwrap(), Some(ana));
        assert_eq!(reopened.find_by_id(&carlos.id).unwrap(), Some(carlos));
    }

    #[test]
    fn test_wrong_passphrase_fails_on_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.dat");
        FileUserStore::open(&path, "secret", rounds())
            .unwrap()
            .create(new_user("carlos"))
            .unwrap();

        assert!(FileUserStore::open(&path, "not-the-secret", rounds()).is_err());
    }

    #[test]
    fn test_failed_write_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.dat");
        let store = FileUserStore::open(&path, "secret", rounds()).unwrap();
        // Occupy the staging path so the write fails
        std::fs::create_dir(path.with_extension("tmp")).unwrap();

        let result = store.create(new_user("carlos"));

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!path.exists());
    }
}
