use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::{error, warn};

use crate::error::AppError;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 64;

lazy_static! {
    static ref HAS_UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref HAS_LOWERCASE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref HAS_SPECIAL: Regex =
        Regex::new(r#"[!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]"#).unwrap();
}

/// Character-class policy only; length bounds are checked by the caller.
pub fn meets_policy(password: &str) -> bool {
    HAS_UPPERCASE.is_match(password)
        && HAS_LOWERCASE.is_match(password)
        && HAS_DIGIT.is_match(password)
        && HAS_SPECIAL.is_match(password)
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AppError::PasswordHashing
        })?
        .to_string();
    Ok(hash)
}

/// A stored hash that fails to parse counts as a mismatch; the caller sees
/// one outcome for both cases, the corruption itself is logged here.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is not a valid PHC string");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "Correct-Horse-Battery-Staple1";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("Wrong-Password-Entirely2", &hash));
    }

    #[test]
    fn malformed_hash_counts_as_mismatch() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }

    #[test]
    fn hashes_are_salted() {
        let password = "Secur3P@ssw0rd!";
        let first = hash_password(password).expect("hashing should succeed");
        let second = hash_password(password).expect("hashing should succeed");
        assert_ne!(first, second);
        assert_ne!(first, password);
    }

    #[test]
    fn policy_requires_all_character_classes() {
        assert!(meets_policy("Abcdef1!"));
        assert!(meets_policy(r#"Tr1cky\quote""#));
        assert!(meets_policy("Under_score9"));

        assert!(!meets_policy("abcdef1!"), "missing uppercase");
        assert!(!meets_policy("ABCDEF1!"), "missing lowercase");
        assert!(!meets_policy("Abcdefg!"), "missing digit");
        assert!(!meets_policy("Abcdefg1"), "missing special");
        assert!(!meets_policy(""), "empty");
    }
}
