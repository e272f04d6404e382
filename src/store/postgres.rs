use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{User, UserStore};
use crate::error::DatabaseError;

type UserRow = (Uuid, String, String, String, String, Option<String>, DateTime<Utc>);

const USER_COLUMNS: &str =
    "id, username, email, full_name, password_hash, refresh_token, created_at";

fn into_user(row: UserRow) -> User {
    let (id, username, email, full_name, password_hash, refresh_token, created_at) = row;
    User {
        id,
        username,
        email,
        full_name,
        password_hash,
        refresh_token,
        created_at,
    }
}

/// `UserStore` over the `users` table
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, full_name, password_hash, refresh_token, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let (exists,) = sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;

        Ok(into_user(row))
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 LIMIT 1",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;

        Ok(into_user(row))
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }

        Ok(())
    }

    async fn replace_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool, DatabaseError> {
        // Single statement: the row lock makes concurrent rotations serialize
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $1 WHERE id = $2 AND refresh_token = $3",
        )
        .bind(next)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Lost the compare, or there is no such user
        if self.exists(id).await? {
            Ok(false)
        } else {
            Err(DatabaseError::NotFound(format!("user {}", id)))
        }
    }
}
