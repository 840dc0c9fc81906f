mod sealed_file;
pub mod tokens;
pub mod users;

pub use sealed_file::SealedFile;
pub use tokens::FileTokenStore;
pub use users::FileUserStore;
