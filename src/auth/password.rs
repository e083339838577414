use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a plaintext password with a fresh random salt.
///
/// Two calls with the same input produce different digests.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(AppError::from)
}

/// Checks a plaintext password against a stored digest.
///
/// A malformed digest is treated as a mismatch rather than an error, so
/// callers never need to distinguish "corrupt hash" from "wrong password".
pub fn verify_password(password: &str, digest: &str) -> bool {
    verify(password, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_hashing_is_salted() {
        let password = "test_password123";
        let first = hash_password(password).unwrap();
        let second = hash_password(password).unwrap();
        assert_ne!(first, second, "each call must use a unique salt");
    }

    #[test]
    fn test_verify_with_malformed_digest_returns_false() {
        assert!(!verify_password("test_password123", "invalidhashformat"));
        assert!(!verify_password("test_password123", ""));
    }
}
