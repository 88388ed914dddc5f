use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// One-way salted password hashing.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> anyhow::Result<String>;
    fn matches(&self, raw: &str, encoded: &str) -> anyhow::Result<bool>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordEncoder;

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> anyhow::Result<String> {
        hash_password(raw)
    }

    fn matches(&self, raw: &str, encoded: &str) -> anyhow::Result<bool> {
        verify_password(raw, encoded)
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
