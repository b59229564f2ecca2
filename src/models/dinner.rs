use serde::{Deserialize, Serialize};

use super::Food;

/// Core dinner record with its associated foods eagerly loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dinner {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub foods: Vec<Food>,
}

/// Request model for creating a new dinner (starts with no foods)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDinnerRequest {
    pub name: String,
}

/// Request model for renaming a dinner; the food set is left untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDinnerRequest {
    pub name: String,
}

impl Dinner {
    /// Create a dinner with an empty food set
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            foods: Vec::new(),
        }
    }

    /// Attach loaded foods, keeping them ordered by id
    pub fn with_foods(mut self, mut foods: Vec<Food>) -> Self {
        foods.sort_by_key(|food| food.id);
        self.foods = foods;
        self
    }

    pub fn contains_food(&self, food_id: i64) -> bool {
        self.foods.iter().any(|food| food.id == food_id)
    }

    pub fn food_count(&self) -> usize {
        self.foods.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_food(id: i64, name: &str, dinner_id: i64) -> Food {
        Food {
            id,
            name: name.to_string(),
            dinner_id: Some(dinner_id),
        }
    }

    #[test]
    fn test_dinner_creation() {
        let dinner = Dinner::new(1, "Sunday roast");

        assert_eq!(dinner.id, 1);
        assert_eq!(dinner.name, "Sunday roast");
        assert_eq!(dinner.food_count(), 0);
        assert!(!dinner.contains_food(1));
    }

    #[test]
    fn test_with_foods_orders_by_id() {
        let dinner = Dinner::new(4, "Curry night").with_foods(vec![
            owned_food(9, "Naan", 4),
            owned_food(2, "Rice", 4),
        ]);

        let ids: Vec<i64> = dinner.foods.iter().map(|food| food.id).collect();
        assert_eq!(ids, vec![2, 9]);
        assert!(dinner.contains_food(9));
        assert!(!dinner.contains_food(3));
    }

    #[test]
    fn test_serde_serialization() {
        let dinner = Dinner::new(3, "Picnic").with_foods(vec![owned_food(5, "Apples", 3)]);

        let json = serde_json::to_value(&dinner).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["foods"][0]["dinnerId"], 3);

        let deserialized: Dinner = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, dinner);
    }

    #[test]
    fn test_missing_foods_defaults_to_empty() {
        let dinner: Dinner = serde_json::from_str(r#"{"id":1,"name":"Soup"}"#).unwrap();
        assert!(dinner.foods.is_empty());
    }
}
