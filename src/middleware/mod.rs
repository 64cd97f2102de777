/// Middleware module
///
/// Call interception for authentication.

mod access_interceptor;

pub use access_interceptor::bearer_token;
pub use access_interceptor::method_name;
pub use access_interceptor::AccessInterceptor;
pub use access_interceptor::AuthenticatedCaller;
