/// User store boundary
///
/// The user record is owned by an external store. The auth core only reads
/// the identifier and password hash and reads/writes the single refresh
/// token field, all through `UserStore`.

mod memory;
mod models;
mod postgres;

pub use memory::InMemoryUserStore;
pub use models::{User, UserProfile};
pub use postgres::PostgresUserStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    /// `DatabaseError::NotFound` when no user has this id
    async fn find_by_id(&self, id: Uuid) -> Result<User, DatabaseError>;

    /// Look a user up by username or email, whichever is given
    ///
    /// # Errors
    /// `DatabaseError::NotFound` when neither matches
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, DatabaseError>;

    /// Overwrite the stored refresh token; `None` clears it
    async fn update_refresh_token(&self, id: Uuid, token: Option<&str>)
        -> Result<(), DatabaseError>;

    /// Write `next` only if the stored token still equals `expected`
    ///
    /// Returns `false` when another writer got there first.
    ///
    /// # Errors
    /// `DatabaseError::NotFound` when no user has this id
    async fn replace_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool, DatabaseError>;
}
