use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Core food record
///
/// A food exists independently of any dinner. `dinner_id` is the single
/// back-reference to the dinner that currently owns it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub dinner_id: Option<i64>,
}

/// Request model for creating a new food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
}

/// Request model for renaming an existing food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFoodRequest {
    pub name: String,
}

impl Food {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dinner_id: None,
        }
    }

    /// Whether the food is attached to the given dinner
    pub fn belongs_to(&self, dinner_id: i64) -> bool {
        self.dinner_id == Some(dinner_id)
    }
}
