//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Compact user view embedded in event responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserShort {
    pub id: i64,
    pub name: String,
}

impl From<User> for UserShort {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}
