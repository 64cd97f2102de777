/// Identity claims
///
/// The payload of a signed access token: who the caller is plus the standard
/// registered claims (RFC 7519).

use serde::{Deserialize, Serialize};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Display name
    pub name: String,
    /// User email
    pub email: String,
    pub roles: Vec<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Unique token id
    pub jti: String,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    /// Create claims valid from now for `lifetime_seconds`
    pub fn new(
        user_id: &str,
        name: &str,
        email: &str,
        roles: &[String],
        lifetime_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            iat: now,
            exp: now + lifetime_seconds,
            nbf: now,
            jti: uuid::Uuid::new_v4().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }
}
