use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{User, UserStore};
use crate::error::DatabaseError;

/// Process-local user store
///
/// Each operation takes the map lock once, so the conditional refresh
/// token replace is atomic per record.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, User>>, DatabaseError> {
        self.users
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("user map lock poisoned".to_string()))
    }

    /// Add a user, returning its id
    pub fn insert(&self, user: User) -> Result<Uuid, DatabaseError> {
        let mut users = self.lock()?;
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    pub fn remove(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.lock()?.remove(&id))
    }

    /// Current refresh token of a user, bypassing the trait
    pub fn refresh_token_of(&self, id: Uuid) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|users| users.get(&id).and_then(|u| u.refresh_token.clone()))
    }
}

fn not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("user {}", id))
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.lock()?.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, DatabaseError> {
        self.lock()?
            .values()
            .find(|u| {
                username.map_or(false, |name| u.username == name)
                    || email.map_or(false, |mail| u.email == mail)
            })
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let mut users = self.lock()?;
        let user = users.get_mut(&id).ok_or_else(|| not_found(id))?;
        user.refresh_token = token.map(str::to_string);
        Ok(())
    }

    async fn replace_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool, DatabaseError> {
        let mut users = self.lock()?;
        let user = users.get_mut(&id).ok_or_else(|| not_found(id))?;

        if user.refresh_token.as_deref() != Some(expected) {
            return Ok(false);
        }

        user.refresh_token = Some(next.to_string());
        Ok(true)
    }
}
