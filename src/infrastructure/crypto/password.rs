//! Password hashing

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with bcrypt. The salt is embedded in the
/// returned hash string.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Constant-time verification of a password against a stored hash.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_correct_and_rejects_wrong() {
        let stored = hash_password("secret1").unwrap();

        assert!(verify_password("secret1", &stored).unwrap());
        assert!(!verify_password("secret2", &stored).unwrap());
    }

    #[test]
    fn hash_is_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }
}
