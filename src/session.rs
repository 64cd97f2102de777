/// Session Orchestrator
///
/// Login, Refresh, Validate and Logout, composed from the token codec, the
/// refresh token store and the credential store. Every operation either
/// fully succeeds or returns exactly one error.

use std::sync::Arc;

use futures::future::try_join;
use serde::{Deserialize, Serialize};

use crate::auth::{verify_password, Claims, RefreshTokenStore, TokenCodec, TokenPair};
use crate::error::{AppError, AuthError};
use crate::store::{CredentialRecord, CredentialStore};
use crate::validators::{is_valid_email, is_valid_password, is_valid_token, is_valid_user_id};

const DEFAULT_ROLE: &str = "user";

/// Result of probing an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Claims>,
}

impl TokenValidation {
    fn invalid() -> Self {
        Self {
            valid: false,
            claims: None,
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    codec: Arc<TokenCodec>,
    refresh_tokens: RefreshTokenStore,
    credentials: Arc<dyn CredentialStore>,
    roles: Vec<String>,
}

impl SessionService {
    pub fn new(
        codec: Arc<TokenCodec>,
        refresh_tokens: RefreshTokenStore,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            codec,
            refresh_tokens,
            credentials,
            roles: vec![DEFAULT_ROLE.to_string()],
        }
    }

    pub fn codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.codec)
    }

    /// Authenticate with email and password
    ///
    /// # Errors
    /// - `InvalidArgument`: empty or malformed email, empty password
    /// - `Unauthenticated`: unknown email or wrong password (indistinguishable)
    /// - `Internal`: credential store, signing or refresh store failure
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let email = is_valid_email(email)?;
        is_valid_password(password)?;

        let record = match self.credentials.find_by_email(&email).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!("Login attempt for unknown account");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => {
                tracing::error!(error = %e, "Credential lookup failed during login");
                return Err(e.into());
            }
        };

        if !verify_password(password, &record.password_hash, record.hash_scheme)? {
            tracing::info!(user_id = %record.user_id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.issue(&record).await?;

        tracing::info!(user_id = %record.user_id, "User logged in successfully");
        Ok(tokens)
    }

    /// Exchange a live refresh token for a new access token
    ///
    /// The token check and the profile lookup run concurrently; the first
    /// failure drops the other and the call fails as a whole.
    ///
    /// # Errors
    /// - `InvalidArgument`: empty user id or refresh token
    /// - `Unauthenticated`: token not live for this user, or profile lookup failed
    /// - `Internal`: signing or refresh store failure after both checks passed
    pub async fn refresh(&self, user_id: &str, refresh_token: &str) -> Result<TokenPair, AppError> {
        let user_id = is_valid_user_id(user_id)?;
        is_valid_token("refresh_token", refresh_token)?;

        let token_check = async {
            match self.refresh_tokens.validate(&user_id, refresh_token).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(AppError::Auth(AuthError::InvalidRefreshToken)),
                Err(e) => Err(AppError::Store(e)),
            }
        };
        let profile = async {
            match self.credentials.find_by_id(&user_id).await {
                Ok(Some(record)) => Ok(record),
                Ok(None) => Err(AppError::NotFound(format!("user {}", user_id))),
                Err(e) => Err(AppError::Store(e)),
            }
        };

        let ((), record) = try_join(token_check, profile).await.map_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Token refresh rejected");
            AppError::Auth(AuthError::InvalidRefreshToken)
        })?;

        let tokens = self.issue(&record).await?;

        tracing::info!(user_id = %user_id, "Token refreshed successfully");
        Ok(tokens)
    }

    /// Probe an access token. Never fails.
    pub fn validate(&self, access_token: &str) -> TokenValidation {
        if access_token.is_empty() {
            return TokenValidation::invalid();
        }

        match self.codec.verify(access_token) {
            Ok(claims) => TokenValidation {
                valid: true,
                claims: Some(claims),
            },
            Err(_) => TokenValidation::invalid(),
        }
    }

    /// End the user's session by deleting their refresh token
    ///
    /// The presented token is not compared; deletion is scoped to the user and
    /// idempotent.
    ///
    /// # Errors
    /// - `InvalidArgument`: empty user id or refresh token
    /// - `Internal`: the delete itself failed
    pub async fn logout(&self, user_id: &str, refresh_token: &str) -> Result<(), AppError> {
        let user_id = is_valid_user_id(user_id)?;
        is_valid_token("refresh_token", refresh_token)?;

        self.refresh_tokens.delete(&user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to delete refresh token");
            AppError::from(e)
        })?;

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Mint an access token and attach the user's live refresh token
    async fn issue(&self, record: &CredentialRecord) -> Result<TokenPair, AppError> {
        let mut tokens = self
            .codec
            .mint(&record.user_id, &record.name, &record.email, &self.roles)?;

        let refresh_token = self
            .refresh_tokens
            .create_or_get(&record.user_id)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %record.user_id, error = %e, "Refresh token store failed");
                AppError::from(e)
            })?;
        tokens.refresh_token = Some(refresh_token);

        Ok(tokens)
    }
}
