//! Store errors.
//!
//! Failures fall into three classes, reported by [`RepositoryError::kind`]:
//! the addressed entity is missing, the caller's input is malformed, or the
//! store itself could not serve the call. Conflict rejections are not
//! errors; they travel as data in `WriteOutcome::Rejected`.

use std::fmt;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a failure happened: store operation, entity and optional id.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: Option<String>,
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    /// Set for transport failures a caller may reasonably try again.
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("operation", &self.operation),
            ("entity", &self.entity),
            ("id", &self.entity_id),
            ("details", &self.details),
        ];
        let mut parts: Vec<String> = fields
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}={}", name, v)))
            .collect();
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
#[allow(clippy::result_large_err)]
pub enum RepositoryError {
    /// Store unreachable: pool exhausted, connection refused or dropped.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// The store answered with a failure.
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Malformed caller input, rejected before any conflict query.
    #[error("Data validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// Bad or missing settings at startup.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// A stored row that cannot be mapped back into the domain.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::connection_with_context(message, ErrorContext::default())
    }

    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::query_with_context(message, ErrorContext::default())
    }

    pub fn query_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::QueryError {
            message: message.into(),
            context,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::not_found_with_context(message, ErrorContext::default())
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_with_context(message, ErrorContext::default())
    }

    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ValidationError {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::internal_with_context(message, ErrorContext::default())
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InternalError {
            message: message.into(),
            context,
        }
    }

    fn parts(&self) -> (&str, &ErrorContext) {
        match self {
            Self::ConnectionError { message, context }
            | Self::QueryError { message, context }
            | Self::NotFound { message, context }
            | Self::ValidationError { message, context }
            | Self::ConfigurationError { message, context }
            | Self::InternalError { message, context } => (message, context),
        }
    }

    /// Informational only: the engine never retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.parts().1.retryable
    }

    /// Tag the failing store operation, keeping any entity details.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The bare message, without the rendered context.
    pub fn message(&self) -> &str {
        self.parts().0
    }

    /// Short machine tag used by the HTTP envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not-found",
            Self::ValidationError { .. } => "invalid-input",
            Self::ConfigurationError { .. } => "configuration-error",
            Self::ConnectionError { .. } | Self::QueryError { .. } | Self::InternalError { .. } => {
                "store-error"
            }
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found("Record not found"),
            Error::DatabaseError(kind, info) => {
                let context = ErrorContext::default().with_details(format!("db_error_kind={:?}", kind));
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::CheckViolation
                    | DatabaseErrorKind::NotNullViolation => {
                        RepositoryError::validation_with_context(message, context)
                    }
                    DatabaseErrorKind::SerializationFailure => {
                        RepositoryError::query_with_context(message, context.retryable())
                    }
                    _ => RepositoryError::query_with_context(message, context),
                }
            }
            Error::DeserializationError(e) => {
                RepositoryError::internal(format!("Deserialization error: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::connection_with_context(
            err.to_string(),
            ErrorContext::default().with_details("pool_error"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_cover_the_three_failure_classes() {
        assert_eq!(RepositoryError::not_found("x").kind(), "not-found");
        assert_eq!(RepositoryError::validation("x").kind(), "invalid-input");
        assert_eq!(RepositoryError::connection("x").kind(), "store-error");
        assert_eq!(RepositoryError::query("x").kind(), "store-error");
        assert_eq!(RepositoryError::internal("x").kind(), "store-error");
    }

    #[test]
    fn test_connection_errors_are_retryable() {
        assert!(RepositoryError::connection("refused").is_retryable());
        assert!(!RepositoryError::query("syntax").is_retryable());
    }

    #[test]
    fn test_with_operation_keeps_entity() {
        let err = RepositoryError::not_found_with_context(
            "gone",
            ErrorContext::default().with_entity("assignment").with_entity_id(3),
        )
        .with_operation("get_assignment");
        let rendered = err.to_string();
        assert!(rendered.contains("operation=get_assignment"));
        assert!(rendered.contains("entity=assignment"));
        assert!(rendered.contains("id=3"));
        assert_eq!(err.message(), "gone");
    }
}
