//! Event rating model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single like/dislike vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingValue {
    Like,
    Dislike,
}

impl RatingValue {
    pub fn as_i16(&self) -> i16 {
        match self {
            RatingValue::Like => 1,
            RatingValue::Dislike => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingValue::Like => "like",
            RatingValue::Dislike => "dislike",
        }
    }
}

/// Aggregated rating of a single event
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventRating {
    pub event_id: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_value_encoding() {
        assert_eq!(RatingValue::Like.as_i16(), 1);
        assert_eq!(RatingValue::Dislike.as_i16(), -1);

        let value: RatingValue = serde_json::from_str("\"like\"").unwrap();
        assert_eq!(value, RatingValue::Like);
    }
}
