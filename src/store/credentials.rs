/// Credential lookup
///
/// Read-only access to durable user records. This service never writes them.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::auth::HashScheme;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub hash_scheme: HashScheme,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError>;

    async fn find_by_id(&self, user_id: &str) -> Result<Option<CredentialRecord>, StoreError>;
}

/// Seedable store keyed by user id
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: CredentialRecord) {
        self.records.write().insert(record.user_id.clone(), record);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.records.read().get(user_id).cloned())
    }
}
