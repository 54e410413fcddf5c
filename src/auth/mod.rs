pub mod bans;
pub mod seed;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

// ── Password helpers ──────────────────────────────────────────

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt    = SaltString::generate(&mut OsRng);
    let argon2  = Argon2::default();
    let hash    = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid hash: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)
}

// ── Token helper ──────────────────────────────────────────────

/// Generate a 64-char hex session token from two UUIDv4s.
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

// ── Password validation ───────────────────────────────────────

// NOTE for production: this function is only called when APP_ENV != "development".
// Before going live, remove the dev guard in routes/auth.rs (register handler)
// so all passwords are validated regardless of environment.
pub fn validate_password_strength(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".into()));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one uppercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one number".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_the_password() {
        let hash = hash_password("Sitter2024x").unwrap();
        assert!(verify_password("Sitter2024x", &hash).is_ok());
    }

    #[test]
    fn verify_rejects_a_wrong_password() {
        let hash = hash_password("Sitter2024x").unwrap();
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        let first  = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn strength_check_wants_length_case_and_digit() {
        assert!(validate_password_strength("Short1").is_err());
        assert!(validate_password_strength("alllowercase1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
        assert!(validate_password_strength("Password1").is_ok());
    }
}
