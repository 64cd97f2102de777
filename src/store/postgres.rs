/// PostgreSQL backends
///
/// `users` holds credential records (read-only here); `session_kv` stands in
/// for a key-value store with TTL. Expiry uses the database clock, and
/// create-or-get is a single upsert so concurrent callers agree on one value.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::credentials::{CredentialRecord, CredentialStore};
use crate::store::key_value::KeyValueStore;

type UserRow = (Uuid, String, String, String, String);

fn into_record(row: UserRow) -> Result<CredentialRecord, StoreError> {
    let (id, name, email, password_hash, hash_scheme) = row;
    Ok(CredentialRecord {
        user_id: id.to_string(),
        name,
        email,
        password_hash,
        hash_scheme: hash_scheme.parse()?,
    })
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, hash_scheme
            FROM users
            WHERE email = $1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_record).transpose()
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        // Ids are UUIDs; anything else cannot match a row
        let id = match Uuid::parse_str(user_id) {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, hash_scheme
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_record).transpose()
    }
}

#[derive(Clone)]
pub struct PgKeyValueStore {
    pool: PgPool,
}

impl PgKeyValueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for PgKeyValueStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<String, StoreError> {
        let (stored,) = sqlx::query_as::<_, (String,)>(
            r#"
            INSERT INTO session_kv (key, value, expires_at)
            VALUES ($1, $2, now() + make_interval(secs => $3))
            ON CONFLICT (key) DO UPDATE
            SET value = CASE WHEN session_kv.expires_at <= now()
                             THEN EXCLUDED.value ELSE session_kv.value END,
                expires_at = CASE WHEN session_kv.expires_at <= now()
                                  THEN EXCLUDED.expires_at ELSE session_kv.expires_at END
            RETURNING value
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(ttl.as_secs_f64())
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM session_kv WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session_kv WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
