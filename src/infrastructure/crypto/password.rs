//! Password hashing utilities

use bcrypt::{hash, verify};

/// Hash a password using bcrypt at the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("s3cret", MIN_BCRYPT_COST).unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify_password("s3cret", &hashed).unwrap());
        assert!(!verify_password("S3cret", &hashed).unwrap());
    }

    #[test]
    fn plaintext_is_not_a_valid_hash() {
        assert!(verify_password("admin", "admin").is_err());
    }
}
