//! Typed errors returned by the generation engine.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Message used when context gathering fails for any reason but a missing entity.
pub const CONTEXT_FAILURE_MESSAGE: &str = "Failed to gather user context";

/// Failure of a generation or context operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// Missing user, active character, or referenced entity.
    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    /// AI tasks already exist for the user's current day.
    #[error("Daily tasks have already been generated for today")]
    AlreadyGenerated,

    /// Context aggregation failed or the completion could not be used.
    #[error("{0}")]
    GenerationFailed(String),

    /// A third-party dependency failed.
    #[error("{message}")]
    Upstream { code: ErrorCode, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage or other internal failure.
    #[error("{0}")]
    Infrastructure(String),
}

impl GenerationError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    pub fn upstream(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. } => *code,
            Self::AlreadyGenerated => ErrorCode::AlreadyGenerated,
            Self::GenerationFailed(_) => ErrorCode::GenerationFailed,
            Self::Upstream { code, .. } => *code,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Status code a REST layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::AlreadyGenerated => 409,
            Self::GenerationFailed(_) => 502,
            Self::Upstream { code, .. } => match code {
                ErrorCode::RateLimited | ErrorCode::ServiceUnavailable => 503,
                _ => 502,
            },
            Self::Infrastructure(_) => 503,
        }
    }
}

impl From<DomainError> for GenerationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            code if code.is_not_found() => Self::NotFound {
                code,
                message: err.message,
            },
            ErrorCode::AlreadyGenerated => Self::AlreadyGenerated,
            ErrorCode::GenerationFailed => Self::GenerationFailed(err.message),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => Self::Validation(ValidationError::invalid_format(
                err.details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string()),
                err.message,
            )),
            code @ (ErrorCode::ConfigurationError
            | ErrorCode::NetworkError
            | ErrorCode::RateLimited
            | ErrorCode::ServiceUnavailable) => Self::Upstream {
                code,
                message: err.message,
            },
            _ => Self::Infrastructure(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            GenerationError::not_found(ErrorCode::CharacterNotFound, "x").http_status(),
            404
        );
        assert_eq!(
            GenerationError::Validation(ValidationError::empty_field("zip")).http_status(),
            400
        );
        assert_eq!(GenerationError::AlreadyGenerated.http_status(), 409);
        assert_eq!(GenerationError::generation_failed("bad json").http_status(), 502);
        assert_eq!(
            GenerationError::upstream(ErrorCode::RateLimited, "slow down").http_status(),
            503
        );
    }

    #[test]
    fn domain_not_found_stays_not_found() {
        let err: GenerationError =
            DomainError::new(ErrorCode::UserNotFound, "User not found").into();
        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[test]
    fn domain_conflict_maps_to_already_generated() {
        let err: GenerationError =
            DomainError::new(ErrorCode::AlreadyGenerated, "duplicate").into();
        assert_eq!(err, GenerationError::AlreadyGenerated);
    }

    #[test]
    fn database_errors_are_infrastructure() {
        let err: GenerationError = DomainError::database("insert task", "boom").into();
        assert!(matches!(err, GenerationError::Infrastructure(_)));
    }
}
