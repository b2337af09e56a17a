//! Password hashing module
//!
//! This module provides secure password hashing and verification using
//! Argon2id, plus the strength policy applied before an account is created.
//!
//! # Security
//!
//! - Uses Argon2id variant (hybrid of Argon2i and Argon2d)
//! - Uses secure default parameters from the argon2 crate
//! - Generates a random salt for each password hash
//! - Verification is constant-time within the argon2 crate

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::PasswordPolicy;

/// Hash a password using Argon2id with secure defaults.
///
/// Returns the hash in PHC string format (algorithm, parameters, salt, and
/// digest). Hashing failure is an internal error; strength validation is a
/// separate, prior step.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `false` on mismatch and on malformed hash input. A hash that
/// cannot be parsed is treated as "does not match" rather than an error so
/// the login path never turns corrupt stored data into a 500.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Result of a password strength check
#[derive(Debug, Clone)]
pub struct StrengthReport {
    /// Whether the password satisfies the policy
    pub is_valid: bool,
    /// Human-readable rule violations, one per failed rule
    pub errors: Vec<String>,
}

/// Check a plaintext password against the configured policy.
///
/// Runs before hashing on account creation; a failing report is a
/// validation error, never an internal one.
pub fn validate_strength(password: &str, policy: &PasswordPolicy) -> StrengthReport {
    let mut errors = Vec::new();

    if password.chars().count() < policy.min_length {
        errors.push(format!(
            "Password must be at least {} characters long",
            policy.min_length
        ));
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".to_string());
    }

    StrengthReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_argon2id_hash() {
        let hash = hash_password("test_password_123").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
    }

    #[test]
    fn test_hash_password_produces_different_hashes() {
        let password = "same_password";
        let hash1 = hash_password(password).expect("Failed to hash password");
        let hash2 = hash_password(password).expect("Failed to hash password");

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = hash_password(password).expect("Failed to hash password");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_password").expect("Failed to hash password");
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_verify_password_malformed_hash_returns_false() {
        assert!(!verify_password("password", "not_a_phc_string"));
        assert!(!verify_password("password", ""));
        assert!(!verify_password("password", "$argon2id$truncated"));
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "pässwörd-测试🔐";
        let hash = hash_password(password).expect("Failed to hash unicode password");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn test_password_hash_not_equal_to_password() {
        let password = "my_secret_password";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(!hash.contains(password));
    }

    #[test]
    fn test_validate_strength_accepts_good_password() {
        let report = validate_strength("Sup3rSecret", &PasswordPolicy::default());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_validate_strength_rejects_short_password() {
        let report = validate_strength("Ab1", &PasswordPolicy::default());
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("8 characters")));
    }

    #[test]
    fn test_validate_strength_reports_each_missing_class() {
        let report = validate_strength("alllowercase", &PasswordPolicy::default());
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("uppercase")));
        assert!(report.errors.iter().any(|e| e.contains("number")));
        assert!(!report.errors.iter().any(|e| e.contains("lowercase")));
    }

    #[test]
    fn test_validate_strength_respects_policy_knobs() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
        };
        let report = validate_strength("zzzz", &policy);
        assert!(report.is_valid);
    }
}
