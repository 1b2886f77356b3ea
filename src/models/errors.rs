use thiserror::Error;

use super::EntryKind;

/// Errors surfaced by catalog store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Failed to fetch {kind}s: {source}")]
    Fetch {
        kind: EntryKind,
        source: RepositoryError,
    },

    #[error("Failed to add {kind}: {source}")]
    Insert {
        kind: EntryKind,
        source: RepositoryError,
    },

    #[error("Failed to update {kind} {id}: {source}")]
    Update {
        kind: EntryKind,
        id: String,
        source: RepositoryError,
    },

    #[error("Failed to delete {kind} {id}: {source}")]
    Delete {
        kind: EntryKind,
        id: String,
        source: RepositoryError,
    },

    #[error("No active edit session for {kind} {id}")]
    NoActiveEdit { kind: EntryKind, id: String },

    #[error("{kind} not found: {id}")]
    EntryNotFound { kind: EntryKind, id: String },
}

/// Repository-level errors for remote table access
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed")]
    ConnectionFailed,

    #[error("Item not found")]
    NotFound,

    #[error("Conditional write rejected: {message}")]
    ConditionFailed { message: String },

    #[error("AWS SDK error: {message}")]
    AwsSdk { message: String },

    #[error("DynamoDB table not found: {table_name}. Ensure the table exists and IAM permissions are correct.")]
    TableNotFound { table_name: String },

    #[error("Invalid item: {message}")]
    InvalidItem { message: String },

    #[error("Timeout occurred during operation")]
    Timeout,
}

/// Validation errors for draft input
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Validation {
            message: err.to_string(),
        }
    }
}

/// Result type alias for store operations
pub type ServiceResult<T> = Result<T, StoreError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = StoreError::EntryNotFound {
            kind: EntryKind::Meal,
            id: "M001".to_string(),
        };
        assert_eq!(error.to_string(), "meal not found: M001");

        let error = StoreError::Fetch {
            kind: EntryKind::Drink,
            source: RepositoryError::ConnectionFailed,
        };
        assert_eq!(
            error.to_string(),
            "Failed to fetch drinks: Database connection failed"
        );

        let validation_error = ValidationError::RequiredField {
            field: "item_name".to_string(),
        };
        assert_eq!(
            validation_error.to_string(),
            "Required field missing: item_name"
        );
    }

    #[test]
    fn test_error_conversion() {
        let validation_error = ValidationError::InvalidValue {
            field: "price".to_string(),
            value: "abc".to_string(),
            reason: "Price must be a number".to_string(),
        };

        let store_error: StoreError = validation_error.into();
        match &store_error {
            StoreError::Validation { message } => {
                assert!(message.contains("Invalid field value"));
            }
            _ => panic!("Expected Validation conversion"),
        }
    }

    #[test]
    fn test_remote_errors_keep_their_source() {
        let error = StoreError::Delete {
            kind: EntryKind::Meal,
            id: "M1".to_string(),
            source: RepositoryError::Timeout,
        };
        assert_eq!(
            std::error::Error::source(&error).map(|e| e.to_string()),
            Some("Timeout occurred during operation".to_string())
        );
    }
}
