/// Backing stores
///
/// Trait seams for the key-value store that holds refresh tokens and the
/// durable record store that holds credentials, with in-memory and
/// PostgreSQL implementations of each.

mod credentials;
mod key_value;
mod postgres;

pub use credentials::CredentialRecord;
pub use credentials::CredentialStore;
pub use credentials::InMemoryCredentialStore;
pub use key_value::InMemoryKeyValueStore;
pub use key_value::KeyValueStore;
pub use postgres::PgCredentialStore;
pub use postgres::PgKeyValueStore;
