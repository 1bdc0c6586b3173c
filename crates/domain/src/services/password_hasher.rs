use crate::errors::DomainError;

/// Hashing is an outbound concern; the domain only stores the opaque result.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}
