/// Authentication module
///
/// Token minting/verification, password verification, refresh token
/// management and the method policy table.

mod claims;
mod jwt;
mod password;
mod policy;
mod refresh_token;

pub use claims::Claims;
pub use jwt::TokenCodec;
pub use jwt::TokenPair;
pub use password::hash_password_with_cost;
pub use password::verify_password;
pub use password::HashScheme;
pub use policy::Access;
pub use policy::MethodPolicy;
pub use policy::SESSION_METHODS;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::RefreshTokenStore;
