use crate::error::AppError;
use bcrypt::{hash, verify};
use std::sync::OnceLock;

/// One-way salted hash of `password` at the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(hash(password, cost)?)
}

/// Hashes new passwords at the configured work factor. Shared as app data.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    decoy: OnceLock<String>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy: OnceLock::new(),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password, self.cost)
    }

    /// Spends the same bcrypt work as a real verification when there is no stored
    /// hash to check against. Always `Ok(false)`.
    pub fn verify_decoy(&self, password: &str) -> Result<bool, AppError> {
        let decoy = match self.decoy.get() {
            Some(decoy) => decoy,
            None => {
                let fresh = self.hash("decoy")?;
                self.decoy.get_or_init(|| fresh)
            }
        };
        verify_password(password, decoy)?;
        Ok(false)
    }
}

/// `Ok(false)` on a mismatch; an unreadable stored hash is an internal error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
