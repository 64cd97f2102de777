/// Token Codec
///
/// Mints and verifies HS256-signed access tokens. The signing key is handed in
/// once at construction; verification never touches a store.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

const MIN_RECOMMENDED_SECRET_LENGTH: usize = 32;

/// Access token plus the refresh token issued alongside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Unix timestamp at which the access token stops verifying
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_seconds: i64,
    issuer: String,
    audience: String,
}

impl TokenCodec {
    /// Build a codec from signing settings
    ///
    /// # Errors
    /// Returns a configuration error if the secret is empty, the access token
    /// lifetime is not positive, or refresh tokens would not outlive the access
    /// tokens issued with them. All are fatal at startup.
    pub fn new(config: &JwtSettings) -> Result<Self, AppError> {
        if config.secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()).into());
        }
        if config.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.access_token_expiry must be positive, got {}",
                config.access_token_expiry
            ))
            .into());
        }
        if config.refresh_token_expiry <= config.access_token_expiry {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.refresh_token_expiry ({}) must exceed jwt.access_token_expiry ({})",
                config.refresh_token_expiry, config.access_token_expiry
            ))
            .into());
        }
        if config.secret.len() < MIN_RECOMMENDED_SECRET_LENGTH {
            tracing::warn!(
                length = config.secret.len(),
                "JWT secret is shorter than {} bytes",
                MIN_RECOMMENDED_SECRET_LENGTH
            );
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime_seconds: config.access_token_expiry,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    /// Mint a new access token for a user
    ///
    /// The returned pair has no refresh token; the caller attaches one.
    ///
    /// # Errors
    /// Returns an internal error if signing fails
    pub fn mint(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        roles: &[String],
    ) -> Result<TokenPair, AppError> {
        let claims = Claims::new(
            user_id,
            name,
            email,
            roles,
            self.lifetime_seconds,
            &self.issuer,
            &self.audience,
        );
        let access_token = self.sign(&claims)?;

        Ok(TokenPair {
            access_token,
            expires_at: claims.exp,
            refresh_token: None,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify an access token and return its claims
    ///
    /// Rejects any algorithm other than HS256, bad signatures, wrong
    /// issuer/audience, and tokens outside their `nbf..=exp` window.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidToken` for every failure
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                AppError::Auth(AuthError::InvalidToken)
            })
    }
}
