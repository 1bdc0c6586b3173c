pub mod sha256_password_hasher;

pub use sha256_password_hasher::Sha256PasswordHasher;
