//! User repository implementation

use sqlx::PgPool;

use crate::models::user::{NewUser, User};
use crate::utils::errors::EventumError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, new_user: &NewUser) -> Result<User, EventumError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventumError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Fetch a set of users by ID
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, EventumError> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    /// List users, optionally restricted to a set of ids
    pub async fn list(
        &self,
        ids: Option<&[i64]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, EventumError> {
        let users = match ids {
            Some(ids) => {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, email FROM users WHERE id = ANY($1) \
                     ORDER BY id ASC LIMIT $2 OFFSET $3",
                )
                .bind(ids.to_vec())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, email FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(users)
    }

    /// Delete a user; returns the number of affected rows
    pub async fn delete(&self, id: i64) -> Result<u64, EventumError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
