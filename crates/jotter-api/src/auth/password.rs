//! Password hashing and verification (Argon2id).
//!
//! Hashes are PHC-format strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! stored in `app_user.password_hash`. Cost parameters come from configuration;
//! verification reads them back from the stored hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use jotter_core::defaults::{
    PASSWORD_HASH_ITERATIONS, PASSWORD_HASH_MEMORY_KIB, PASSWORD_HASH_PARALLELISM,
    PASSWORD_MIN_LENGTH,
};
use jotter_core::{Error, Result};

/// Message returned when a password fails the strength policy.
pub const WEAK_PASSWORD_MESSAGE: &str = "Password must be at least 8 characters long and \
     contain an uppercase letter, a lowercase letter, a number and a special character";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: PASSWORD_HASH_MEMORY_KIB,
            iterations: PASSWORD_HASH_ITERATIONS,
            parallelism: PASSWORD_HASH_PARALLELISM,
        }
    }
}

/// Argon2id hasher bound to one set of cost parameters.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a throwaway password, verified when a login names an unknown
    /// account so both paths cost one Argon2 run.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(params: PasswordParams) -> Result<Self> {
        let argon2_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| Error::Config(format!("invalid password hash parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);
        let dummy_hash = hash_with(&argon2, "jotter-timing-equalizer")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a plaintext password into a PHC string.
    pub fn hash(&self, password: &str) -> Result<String> {
        hash_with(&self.argon2, password)
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(false)` on mismatch; a malformed stored hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| Error::Internal(format!("invalid stored password hash: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burn one verification against the dummy hash. Always returns false.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }
}

fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Internal(format!("failed to hash password: {}", e)))
}

/// Enforce the password strength policy.
pub fn check_strength(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;
    let upper = password.chars().any(|c| c.is_uppercase());
    let lower = password.chars().any(|c| c.is_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if long_enough && upper && lower && digit && symbol {
        Ok(())
    } else {
        Err(Error::InvalidInput(WEAK_PASSWORD_MESSAGE.to_string()))
    }
}
