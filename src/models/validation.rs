use super::{
    CreateDinnerRequest, CreateFoodRequest, UpdateDinnerRequest, UpdateFoodRequest,
    ValidationError, ValidationResult,
};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for CreateDinnerRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("dinner_name", &self.name)
    }
}

impl Validate for UpdateDinnerRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("dinner_name", &self.name)
    }
}

impl Validate for CreateFoodRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("food_name", &self.name)
    }
}

impl Validate for UpdateFoodRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_name("food_name", &self.name)
    }
}

/// Validate a record name. Only blank names are rejected; anything else is
/// stored exactly as sent.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("food_name", "Mashed potatoes").is_ok());
        assert!(validate_name("food_name", "  padded  ").is_ok());
        assert!(validate_name("dinner_name", "Crème brûlée night").is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        for blank in ["", "   ", "\t\n"] {
            match validate_name("dinner_name", blank) {
                Err(ValidationError::RequiredField { field }) => assert_eq!(field, "dinner_name"),
                other => panic!("Expected RequiredField, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_long_and_multiline_names_accepted() {
        assert!(validate_name("food_name", &"b".repeat(201)).is_ok());
        assert!(validate_name("food_name", &"c".repeat(5000)).is_ok());
        assert!(validate_name("dinner_name", "Line one\nLine two").is_ok());
        assert!(validate_name("food_name", "bell\u{0007}").is_ok());
    }

    #[test]
    fn test_request_validation() {
        let request = CreateDinnerRequest {
            name: "Tacos".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = UpdateFoodRequest {
            name: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
