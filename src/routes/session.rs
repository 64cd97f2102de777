/// Session Routes
///
/// JSON bindings for the `auth.v1.AuthService` methods. Handlers only map
/// request/response bodies; the rules live in `SessionService`.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{Claims, TokenPair};
use crate::error::AppError;
use crate::middleware::AuthenticatedCaller;
use crate::session::SessionService;

pub const AUTH_SERVICE: &str = "auth.v1.AuthService";

/// Missing fields deserialize as empty strings so the service reports them
/// as `InvalidArgument`.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
    pub user_id: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ValidateTokenRequest {
    pub access_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LogoutRequest {
    pub refresh_token: String,
    pub user_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub tokens: TokenPair,
}

#[derive(Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub claims: Claims,
}

/// POST /auth.v1.AuthService/Login
///
/// # Errors
/// - 400: empty or malformed email, empty password
/// - 401: invalid credentials
/// - 500: store or signing failure
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let tokens = session.login(&form.email, &form.password).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { tokens }))
}

/// POST /auth.v1.AuthService/RefreshToken
///
/// # Errors
/// - 400: empty user id or refresh token
/// - 401: refresh token not live for this user
/// - 500: store or signing failure
pub async fn refresh_token(
    form: web::Json<RefreshTokenRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let tokens = session.refresh(&form.user_id, &form.refresh_token).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { tokens }))
}

/// POST /auth.v1.AuthService/ValidateToken
///
/// Always 200; an unusable token yields `{"valid": false}`.
pub async fn validate_token(
    form: web::Json<ValidateTokenRequest>,
    session: web::Data<SessionService>,
) -> HttpResponse {
    HttpResponse::Ok().json(session.validate(&form.access_token))
}

/// POST /auth.v1.AuthService/Logout
pub async fn logout(
    form: web::Json<LogoutRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    session.logout(&form.user_id, &form.refresh_token).await?;
    Ok(HttpResponse::Ok().json(LogoutResponse { success: true }))
}

/// POST /auth.v1.AuthService/WhoAmI
///
/// **Protected.** Echoes the claims the interceptor attached to the call.
pub async fn who_am_i(caller: web::ReqData<AuthenticatedCaller>) -> HttpResponse {
    HttpResponse::Ok().json(WhoAmIResponse {
        claims: caller.claims().clone(),
    })
}
