/// Authentication module
///
/// Password hashing, token signing/verification, refresh token storage
/// and the login/logout/refresh flows built from them.

mod claims;
mod clock;
mod jwt;
mod password;
mod service;
mod session;
mod token_service;

pub use claims::{Claims, TokenKind};
pub use clock::{Clock, MockClock, SystemClock};
pub use jwt::TokenCodec;
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use service::{AuthService, AuthenticatedSession};
pub use session::{tokens_match, SessionStore};
pub use token_service::{TokenPair, TokenService};
