//! Salted password hashing
//!
//! Hashes are stored as `v1$<salt>$<digest>` with URL-safe base64 parts.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;

const HASH_VERSION: &str = "v1";
const SALT_LEN: usize = 16;

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    format!(
        "{}${}${}",
        HASH_VERSION,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest(&salt, password))
    )
}

/// Check `password` against a stored hash. Malformed hashes never match.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some(HASH_VERSION), Some(encoded_salt), Some(encoded_digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(salt) = URL_SAFE_NO_PAD.decode(encoded_salt) else {
        return false;
    };
    let Ok(expected) = URL_SAFE_NO_PAD.decode(encoded_digest) else {
        return false;
    };

    constant_time_eq(&expected, &digest(&salt, password))
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse");
        assert!(hash.starts_with("v1$"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "correct horsE"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("password123");
        let second = hash_password("password123");
        assert_ne!(first, second);
        assert!(verify_password(&first, "password123"));
        assert!(verify_password(&second, "password123"));
    }

    #[test]
    fn malformed_hashes_never_match() {
        assert!(!verify_password("", "anything"));
        assert!(!verify_password("plaintext", "plaintext"));
        assert!(!verify_password("v2$abc$def", "anything"));
        assert!(!verify_password("v1$***$***", "anything"));

        let hash = hash_password("password123");
        assert!(!verify_password(&format!("{hash}$extra"), "password123"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::InvalidInput(_))
        ));
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }
}
