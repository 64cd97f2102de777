/// Password Hashing and Verification
///
/// Credential records name the scheme their hash was produced with, so
/// verification dispatches on it instead of assuming one scheme forever.

use std::fmt;
use std::str::FromStr;

use bcrypt::{hash, verify};

use crate::error::{AppError, StoreError};

/// Hash scheme recorded next to each password hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Bcrypt,
}

impl HashScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashScheme::Bcrypt => "bcrypt",
        }
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashScheme {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(HashScheme::Bcrypt),
            other => Err(StoreError::Corrupt(format!("unknown hash scheme '{}'", other))),
        }
    }
}

/// Hash a password with bcrypt at an explicit cost
///
/// # Errors
/// Returns error if bcrypt hashing fails
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// # Errors
/// Returns error if the stored hash cannot be parsed for its scheme
pub fn verify_password(password: &str, hash: &str, scheme: HashScheme) -> Result<bool, AppError> {
    match scheme {
        HashScheme::Bcrypt => verify(password, hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e))),
    }
}
