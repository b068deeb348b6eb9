//! User service implementation
//!
//! Thin CRUD layer over the user repository with input validation.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::user::{NewUser, User};
use crate::services::event::validate_pagination;
use crate::utils::errors::{self, EventumError, Result};

/// User service for managing user accounts
#[derive(Clone)]
pub struct UserService {
    db: DatabaseService,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Register a new user
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        debug!(email = %new_user.email, "Creating user");
        validate_new_user(&new_user)?;

        match self.db.users.create(&new_user).await {
            Ok(user) => {
                info!(user_id = user.id, "User created");
                Ok(user)
            }
            Err(EventumError::Database(e)) if errors::is_unique_violation(&e) => {
                Err(EventumError::conflict(format!(
                    "email {} is already registered",
                    new_user.email
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// List users, optionally restricted to a set of ids
    pub async fn list(
        &self,
        ids: Option<Vec<i64>>,
        from: i64,
        size: i64,
    ) -> Result<Vec<User>> {
        validate_pagination(from, size)?;
        self.db.users.list(ids.as_deref(), size, from).await
    }

    /// Delete a user
    pub async fn delete(&self, user_id: i64) -> Result<()> {
        if user_id == 0 {
            return Err(EventumError::validation("user id must be positive"));
        }

        let deleted = self.db.users.delete(user_id).await?;
        if deleted == 0 {
            return Err(EventumError::not_found(format!(
                "user {} does not exist",
                user_id
            )));
        }
        info!(user_id = user_id, "User deleted");

        Ok(())
    }
}

fn validate_new_user(new_user: &NewUser) -> Result<()> {
    if new_user.name.trim().is_empty() {
        return Err(EventumError::validation("user name cannot be blank"));
    }
    if new_user.email.trim().is_empty() {
        return Err(EventumError::validation("user email cannot be blank"));
    }
    if !new_user.email.contains('@') {
        return Err(EventumError::validation(format!(
            "'{}' is not a valid email address",
            new_user.email
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rejects_blank_name() {
        let new_user = NewUser {
            name: "   ".to_string(),
            email: "dancer@example.com".to_string(),
        };
        assert_matches!(validate_new_user(&new_user), Err(EventumError::Validation(_)));
    }

    #[test]
    fn test_rejects_mailless_email() {
        let new_user = NewUser {
            name: "Sam".to_string(),
            email: "not-an-email".to_string(),
        };
        assert_matches!(validate_new_user(&new_user), Err(EventumError::Validation(_)));
    }

    #[test]
    fn test_accepts_plain_user() {
        let new_user = NewUser {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
        };
        assert!(validate_new_user(&new_user).is_ok());
    }
}
