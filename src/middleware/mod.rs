/// Middleware module
///
/// Authentication gate for protected scopes.

mod jwt_middleware;

pub use jwt_middleware::JwtMiddleware;
