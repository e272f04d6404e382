/// Uniform success envelope
///
/// The error side of the envelope lives in `error::ErrorResponse`.

use serde::Serialize;

pub const SUCCESSFUL_LOGIN: &str = "User logged In Successfully";
pub const SUCCESSFUL_LOGOUT: &str = "User logged Out";
pub const ACCESS_TOKEN_REFRESHED: &str = "Access token refreshed";
pub const CURRENT_USER_FETCHED: &str = "Current user fetched successfully";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }
}
