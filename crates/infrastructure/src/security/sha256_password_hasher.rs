use domain::{DomainError, PasswordHasher};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LENGTH: usize = 16;

/// Salted SHA-256, stored as `hex(salt)$hex(digest)`.
#[derive(Debug, Default, Clone)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    fn digest(salt: &[u8], password: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        if password.is_empty() {
            return Err(DomainError::ValidationError("Password cannot be empty".to_string()));
        }

        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = Self::digest(&salt, password);

        Ok(format!("{}${}", hex::encode(salt), hex::encode(digest)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let (salt, expected) = match hash.split_once('$') {
            Some(parts) => parts,
            None => return false,
        };

        match (hex::decode(salt), hex::decode(expected)) {
            // ct_eq is false for slices of different lengths
            (Ok(salt), Ok(expected)) => Self::digest(&salt, password).ct_eq(&expected).into(),
            _ => false,
        }
    }
}
