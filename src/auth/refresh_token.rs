/// Refresh Token Management
///
/// One live refresh token per user, kept in a key-value store under
/// `refresh:<user_id>` with a TTL. Tokens are:
/// - Cryptographically secure random 64-character alphanumeric strings
/// - Created with set-if-absent, so a live token is returned, never replaced
/// - Removed explicitly on logout or implicitly when the TTL runs out

use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::store::KeyValueStore;

const TOKEN_LENGTH: usize = 64;
const KEY_PREFIX: &str = "refresh:";

/// Generate a new cryptographically secure refresh token
///
/// 64 base62 characters, roughly 380 bits of entropy.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Compare two tokens by their SHA-256 digests
///
/// Every digest byte is folded in, so the comparison never exits early.
fn tokens_match(stored: &str, candidate: &str) -> bool {
    let stored = hash_token(stored);
    let candidate = hash_token(candidate);

    stored
        .iter()
        .zip(candidate.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

pub fn refresh_key(user_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, user_id)
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Return the user's live refresh token, creating one if none exists
    ///
    /// # Errors
    /// Returns error if the backing store fails
    pub async fn create_or_get(&self, user_id: &str) -> Result<String, StoreError> {
        let candidate = generate_refresh_token();
        let token = self
            .store
            .set_if_absent(&refresh_key(user_id), &candidate, self.ttl)
            .await?;

        if token == candidate {
            tracing::debug!(user_id = %user_id, "Issued new refresh token");
        }
        Ok(token)
    }

    /// True iff the user has a live token equal to `candidate`
    ///
    /// # Errors
    /// Returns error if the backing store fails
    pub async fn validate(&self, user_id: &str, candidate: &str) -> Result<bool, StoreError> {
        match self.store.get(&refresh_key(user_id)).await? {
            Some(stored) => Ok(tokens_match(&stored, candidate)),
            None => {
                tracing::debug!(user_id = %user_id, "No live refresh token");
                Ok(false)
            }
        }
    }

    /// Remove the user's refresh token. Absent tokens are fine.
    ///
    /// # Errors
    /// Returns error if the backing store fails
    pub async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.store.delete(&refresh_key(user_id)).await
    }
}
