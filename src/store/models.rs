use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Full user record as held by the store
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User projection safe to hand to clients
///
/// Never carries the password hash or the refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
}

impl User {
    pub fn new(username: &str, email: &str, full_name: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_lowercase(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            password_hash,
            refresh_token: None,
            created_at: Utc::now(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
