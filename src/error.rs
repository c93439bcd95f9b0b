/// Failure taxonomy shared by every Lodestone component
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Lodestone
///
/// The first five variants are the caller-facing kinds. Everything after them
/// wraps an unexpected collaborator failure and is reported as `Internal`.
#[derive(Error, Debug)]
pub enum YggError {
    /// Malformed or missing request data
    #[error("{message}")]
    BadRequest { message: String, passthrough: bool },

    /// Credentials or token absent entirely
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials or token present but invalid or mismatched
    #[error("{0}")]
    Forbidden(String),

    /// Request the service refuses to honour, such as signed data
    #[error("{0}")]
    IllegalArgument(String),

    /// Unexpected or unimplemented condition
    #[error("{0}")]
    Internal(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Password hashing errors
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors on stored data
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Outbound HTTP errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Caller-facing failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    IllegalArgument,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::BadRequest | ErrorKind::IllegalArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable `errorType` field
    pub fn error_type(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest | ErrorKind::IllegalArgument => "BAD_REQUEST",
            ErrorKind::Unauthorized | ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Exception name the legacy clients match on
    pub fn error_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized | ErrorKind::Forbidden => "ForbiddenOperationException",
            ErrorKind::IllegalArgument => "IllegalArgumentException",
            ErrorKind::Internal => "BaseYggdrasilException",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::IllegalArgument => "illegal_argument",
            ErrorKind::Internal => "internal",
        }
    }
}

impl YggError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        YggError::BadRequest {
            message: message.into(),
            passthrough: false,
        }
    }

    /// A not-found condition that an upstream authority might still answer
    pub fn not_found(message: impl Into<String>) -> Self {
        YggError::BadRequest {
            message: message.into(),
            passthrough: true,
        }
    }

    pub fn invalid_token() -> Self {
        YggError::Forbidden("Invalid token.".to_string())
    }

    pub fn invalid_credentials() -> Self {
        YggError::Forbidden("Invalid credentials. Invalid username or password.".to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            YggError::BadRequest { .. } => ErrorKind::BadRequest,
            YggError::Unauthorized(_) => ErrorKind::Unauthorized,
            YggError::Forbidden(_) => ErrorKind::Forbidden,
            YggError::IllegalArgument(_) => ErrorKind::IllegalArgument,
            YggError::Internal(_)
            | YggError::Database(_)
            | YggError::Migration(_)
            | YggError::PasswordHash(_)
            | YggError::Io(_)
            | YggError::Serialization(_)
            | YggError::Http(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Whether a deployment may hand this request to an upstream authority
    pub fn passthrough_allowed(&self) -> bool {
        matches!(
            self,
            YggError::BadRequest {
                passthrough: true,
                ..
            }
        )
    }

    /// Message safe to show the caller
    pub fn public_message(&self) -> String {
        match self {
            YggError::BadRequest { message, .. } => message.clone(),
            YggError::Unauthorized(message)
            | YggError::Forbidden(message)
            | YggError::IllegalArgument(message)
            | YggError::Internal(message) => message.clone(),
            // Don't leak details
            _ => "Internal server error.".to_string(),
        }
    }
}

/// Yggdrasil error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub error_type: String,
    pub error_message: String,
    pub developer_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Marker left on error responses for the path-stamping middleware
#[derive(Debug, Clone)]
pub struct ClassifiedFailure {
    pub body: ErrorBody,
    pub kind: ErrorKind,
    pub passthrough: bool,
}

impl From<&YggError> for ErrorBody {
    fn from(err: &YggError) -> Self {
        let kind = err.kind();
        let message = err.public_message();
        ErrorBody {
            error: kind.error_name().to_string(),
            error_type: kind.error_type().to_string(),
            error_message: message.clone(),
            developer_message: message,
            path: None,
        }
    }
}

/// Convert YggError to HTTP response
impl IntoResponse for YggError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "request failed with internal error");
        }
        crate::metrics::record_error(kind);

        let body = ErrorBody::from(&self);
        let failure = ClassifiedFailure {
            body: body.clone(),
            kind,
            passthrough: self.passthrough_allowed(),
        };

        let mut response = (kind.status_code(), Json(body)).into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

impl From<JsonRejection> for YggError {
    fn from(rejection: JsonRejection) -> Self {
        YggError::bad_request(rejection.body_text())
    }
}

/// Result type alias for Lodestone operations
pub type YggResult<T> = Result<T, YggError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(YggError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            YggError::Unauthorized("Forbidden".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(YggError::invalid_token().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            YggError::IllegalArgument("Unable to sign data.".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            YggError::Internal("Not yet implemented.".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_not_found_is_passthrough_eligible() {
        assert!(YggError::not_found("Profile does not exist.").passthrough_allowed());
        assert!(!YggError::bad_request("No body supplied").passthrough_allowed());
        assert!(!YggError::invalid_credentials().passthrough_allowed());
        assert!(!YggError::Unauthorized("Forbidden".into()).passthrough_allowed());
        assert!(!YggError::Internal("boom".into()).passthrough_allowed());
    }

    #[test]
    fn test_store_errors_are_internal_and_opaque() {
        let err = YggError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.public_message(), "Internal server error.");
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::from(&YggError::IllegalArgument("Unable to sign data.".into()));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "IllegalArgumentException");
        assert_eq!(json["errorType"], "BAD_REQUEST");
        assert_eq!(json["errorMessage"], "Unable to sign data.");
        assert_eq!(json["developerMessage"], "Unable to sign data.");
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_forbidden_and_unauthorized_share_exception_name() {
        let unauthorized = ErrorBody::from(&YggError::Unauthorized("Forbidden".into()));
        let forbidden = ErrorBody::from(&YggError::invalid_token());
        assert_eq!(unauthorized.error, "ForbiddenOperationException");
        assert_eq!(forbidden.error, "ForbiddenOperationException");
        assert_eq!(unauthorized.error_type, "FORBIDDEN");
    }
}
