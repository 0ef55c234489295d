/// Authentication module
///
/// Password hashing, JWT issuance/validation, and persisting the
/// latest token pair on the user record.

mod claims;
mod jwt;
mod password;
mod refresher;

pub use claims::{AuthenticatedUser, Claims, RefreshClaims};
pub use jwt::{TokenIssuer, TokenValidator};
pub use password::{hash_password_with_cost, verify_password, HASH_COST, MAX_PASSWORD_BYTES};
pub use refresher::refresh_and_persist;
