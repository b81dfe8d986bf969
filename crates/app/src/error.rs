//! Application error taxonomy.

use leaflet_core::Ident;
use leaflet_metadata::MetadataError;
use thiserror::Error;

/// Failure reported by an external collaborator such as the blob service.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// Use-case errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("not authorized to {operation}")]
    NotAuthorized { operation: String },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// The caller is signed in with an identity that has no account yet.
    #[error("first login pending for {ident}")]
    FirstLoginPending { ident: Ident },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("storage error: {0}")]
    Storage(MetadataError),
}

impl AppError {
    pub(crate) fn not_authorized(operation: &str) -> Self {
        Self::NotAuthorized {
            operation: operation.to_string(),
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound { kind, id } => Self::NotFound {
                entity: kind.to_string(),
                id,
            },
            other => Self::Storage(other),
        }
    }
}

/// Result type for use cases.
pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_not_found_maps_to_not_found() {
        let err: AppError = MetadataError::not_found("page", "alice/blog").into();
        match err {
            AppError::NotFound { entity, id } => {
                assert_eq!(entity, "page");
                assert_eq!(id, "alice/blog");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_other_metadata_errors_are_storage() {
        let err: AppError = MetadataError::Corrupt("bad row".to_string()).into();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::not_authorized("update page").to_string(),
            "not authorized to update page"
        );
        assert_eq!(
            AppError::validation("name", "too short").to_string(),
            "invalid name: too short"
        );
    }
}
