mod auth;
mod health_check;

pub use auth::{current_user, login, logout, refresh_access_token, LoginRequest, RefreshRequest};
pub use health_check::health_check;
