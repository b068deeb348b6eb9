//! Category service implementation
//!
//! Thin CRUD layer over the category repository. Categories referenced by
//! events cannot be deleted.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::category::{Category, NewCategory};
use crate::services::event::validate_pagination;
use crate::utils::errors::{self, EventumError, Result};

const NAME_MAX: usize = 50;

/// Category service for event categories
#[derive(Clone)]
pub struct CategoryService {
    db: DatabaseService,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Create a new category
    pub async fn create(&self, new_category: NewCategory) -> Result<Category> {
        debug!(name = %new_category.name, "Creating category");
        validate_name(&new_category.name)?;

        match self.db.categories.create(&new_category.name).await {
            Ok(category) => {
                info!(category_id = category.id, "Category created");
                Ok(category)
            }
            Err(EventumError::Database(e)) if errors::is_unique_violation(&e) => {
                Err(EventumError::conflict(format!(
                    "category name '{}' is already taken",
                    new_category.name
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Rename an existing category
    pub async fn rename(&self, category_id: i64, new_category: NewCategory) -> Result<Category> {
        if category_id == 0 {
            return Err(EventumError::validation("category id must be positive"));
        }
        validate_name(&new_category.name)?;

        match self.db.categories.rename(category_id, &new_category.name).await {
            Ok(Some(category)) => Ok(category),
            Ok(None) => Err(EventumError::not_found(format!(
                "category {} does not exist",
                category_id
            ))),
            Err(EventumError::Database(e)) if errors::is_unique_violation(&e) => {
                Err(EventumError::conflict(format!(
                    "category name '{}' is already taken",
                    new_category.name
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Find category by ID
    pub async fn find(&self, category_id: i64) -> Result<Category> {
        if category_id == 0 {
            return Err(EventumError::validation("category id must be positive"));
        }
        self.db
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| {
                EventumError::not_found(format!("category {} does not exist", category_id))
            })
    }

    /// List categories with pagination
    pub async fn list(&self, from: i64, size: i64) -> Result<Vec<Category>> {
        validate_pagination(from, size)?;
        self.db.categories.list(size, from).await
    }

    /// Delete a category with no attached events
    pub async fn delete(&self, category_id: i64) -> Result<()> {
        if category_id == 0 {
            return Err(EventumError::validation("category id must be positive"));
        }

        if self.db.events.exists_with_category(category_id).await? {
            return Err(EventumError::conflict(format!(
                "category {} still has events attached",
                category_id
            )));
        }

        let deleted = self.db.categories.delete(category_id).await?;
        if deleted == 0 {
            return Err(EventumError::not_found(format!(
                "category {} does not exist",
                category_id
            )));
        }
        info!(category_id = category_id, "Category deleted");

        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(EventumError::validation("category name cannot be blank"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(EventumError::validation(format!(
            "category name must be at most {} characters",
            NAME_MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rejects_blank_and_oversized_names() {
        assert_matches!(validate_name(""), Err(EventumError::Validation(_)));
        assert_matches!(validate_name("  "), Err(EventumError::Validation(_)));
        assert_matches!(
            validate_name(&"x".repeat(51)),
            Err(EventumError::Validation(_))
        );
        assert!(validate_name("concerts").is_ok());
    }
}
