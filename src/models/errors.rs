use thiserror::Error;
use tracing::debug;

/// Service-level errors that can occur in business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Dinner with ID {id} not found.")]
    DinnerNotFound { id: i64 },

    #[error("Food with ID {id} not found.")]
    FoodNotFound { id: i64 },

    #[error("Food with ID {food_id} is not part of dinner {dinner_id}.")]
    FoodNotInDinner { dinner_id: i64, food_id: i64 },

    #[error("No dinners found.")]
    NoDinnersFound,

    #[error("This food is already added to the dinner.")]
    DuplicateAssociation { dinner_id: i64, food_id: i64 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Concurrent modification of {entity} {id}")]
    ConcurrencyConflict { entity: &'static str, id: i64 },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Timeout occurred during operation")]
    Timeout,

    #[error("Migration failed: {source}")]
    Migration {
        #[from]
        source: sqlx::migrate::MigrateError,
    },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        debug!(error = %err, "sqlx operation failed");

        match err {
            sqlx::Error::PoolTimedOut => RepositoryError::Timeout,
            sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed | sqlx::Error::Io(_) => {
                RepositoryError::ConnectionFailed {
                    message: err.to_string(),
                }
            }
            sqlx::Error::Database(ref db_err)
                if db_err.is_foreign_key_violation()
                    || db_err.is_unique_violation()
                    || db_err.is_check_violation() =>
            {
                RepositoryError::ConstraintViolation {
                    message: db_err.message().to_string(),
                }
            }
            other => RepositoryError::Database {
                message: other.to_string(),
            },
        }
    }
}

/// Validation errors for input data
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
