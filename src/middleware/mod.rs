/// Middleware module
///
/// Request pipeline stages: the access token gate and request logging.

mod auth_gate;
mod request_logger;

pub use auth_gate::{authenticate, extract_access_token, AuthGate, CurrentUser};
pub use request_logger::{RequestId, RequestLogger, REQUEST_ID_HEADER};
