//! Category repository implementation

use sqlx::PgPool;

use crate::models::category::Category;
use crate::utils::errors::EventumError;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category
    pub async fn create(&self, name: &str) -> Result<Category, EventumError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Rename a category
    pub async fn rename(&self, id: i64, name: &str) -> Result<Option<Category>, EventumError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Find category by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, EventumError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }

    /// Fetch a set of categories by ID
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Category>, EventumError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// List categories with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Category>, EventumError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Delete a category; returns the number of affected rows
    pub async fn delete(&self, id: i64) -> Result<u64, EventumError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
