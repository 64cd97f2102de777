mod health_check;
mod session;

pub use health_check::health_check;
pub use session::{
    login, logout, refresh_token, validate_token, who_am_i, LoginRequest, LogoutRequest,
    LogoutResponse, RefreshTokenRequest, TokenResponse, ValidateTokenRequest, WhoAmIResponse,
    AUTH_SERVICE,
};
