//! Password hashing for dashboard and app accounts
//!
//! bcrypt with the work factor taken from `SecurityConfig`. A stored
//! hash embeds its own cost, so changing the setting never invalidates
//! existing credentials.

use bcrypt::{hash, verify, BcryptError};

/// Hash a password with the given bcrypt work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Check a candidate password against a stored bcrypt hash.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(password, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // lowest cost bcrypt accepts; full-cost hashing is too slow for tests
    const TEST_COST: u32 = 4;

    #[test]
    fn test_verify_round_trip() {
        let hashed = hash_password("operator#2024", TEST_COST).unwrap();
        assert!(verify_password("operator#2024", &hashed).unwrap());
        assert!(!verify_password("operator#2025", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("operator#2024", TEST_COST).unwrap();
        let second = hash_password("operator#2024", TEST_COST).unwrap();
        assert_ne!(first, second);
        assert!(verify_password("operator#2024", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("operator#2024", "not-a-bcrypt-hash").is_err());
    }
}
