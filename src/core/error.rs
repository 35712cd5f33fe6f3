//! The typed error every failed API call resolves to.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Field name to validation messages, as sent by the backend.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The error contract attached to non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

/// Resolved details of a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub message: String,
    pub code: Option<String>,
    pub errors: Option<FieldErrors>,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            errors: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response reached us.
    #[error("{message}")]
    Network { message: String },
    #[error("{}", .0.message)]
    Auth(ErrorDetails),
    #[error("{}", .0.message)]
    Forbidden(ErrorDetails),
    #[error("{}", .0.message)]
    NotFound(ErrorDetails),
    #[error("{}", .details.message)]
    Server { status: u16, details: ErrorDetails },
    /// A 4xx response carrying field level errors.
    #[error("{}", .details.message)]
    Validation { status: u16, details: ErrorDetails },
    /// Any other non-2xx response.
    #[error("{}", .details.message)]
    Request { status: u16, details: ErrorDetails },
    /// A response that could not be understood.
    #[error("An unexpected error occurred")]
    Unknown { status: u16 },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    /// Classifies a failed response by its status code.
    pub fn from_status(status: u16, details: ErrorDetails) -> Self {
        match status {
            0 => ApiError::Network {
                message: details.message,
            },
            401 => ApiError::Auth(details),
            403 => ApiError::Forbidden(details),
            404 => ApiError::NotFound(details),
            s if s >= 500 => ApiError::Server { status: s, details },
            s if (400..500).contains(&s)
                && details.errors.as_ref().is_some_and(|e| !e.is_empty()) =>
            {
                ApiError::Validation { status: s, details }
            }
            s => ApiError::Request { status: s, details },
        }
    }

    /// HTTP status of the failed response; 0 when no response was received.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Network { .. } => 0,
            ApiError::Auth(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Server { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Request { status, .. }
            | ApiError::Unknown { status } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Network { message } => message,
            ApiError::Unknown { .. } => UNEXPECTED_ERROR_MESSAGE,
            _ => self
                .details()
                .map_or(UNEXPECTED_ERROR_MESSAGE, |d| d.message.as_str()),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Network { .. } => Some(NETWORK_ERROR_CODE),
            _ => self.details().and_then(|d| d.code.as_deref()),
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.details().and_then(|d| d.errors.as_ref())
    }

    fn details(&self) -> Option<&ErrorDetails> {
        match self {
            ApiError::Auth(d) | ApiError::Forbidden(d) | ApiError::NotFound(d) => Some(d),
            ApiError::Server { details, .. }
            | ApiError::Validation { details, .. }
            | ApiError::Request { details, .. } => Some(details),
            ApiError::Network { .. } | ApiError::Unknown { .. } => None,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    pub fn is_forbidden_error(&self) -> bool {
        matches!(self, ApiError::Forbidden(_))
    }

    pub fn is_not_found_error(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Server { .. })
    }
}

/// The user-facing message for any error.
///
/// [`ApiError`]s keep their own message, other errors use their display text
/// and anything without a message gets the generic one.
pub fn error_message(error: &anyhow::Error) -> String {
    if let Some(api_error) = error.downcast_ref::<ApiError>() {
        return api_error.message().to_string();
    }
    let message = error.to_string();
    if message.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Logs the error and returns its user-facing message.
pub fn handle_error(error: &anyhow::Error) -> String {
    tracing::error!(error = ?error, "Request failed");
    error_message(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn validation_errors() -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), vec!["Invalid email".to_string()]);
        errors
    }

    #[test]
    fn test_minimal_error() {
        let error = ApiError::from_status(404, ErrorDetails::new("Not found"));

        assert_eq!(error.status_code(), 404);
        assert_eq!(error.message(), "Not found");
        assert!(error.code().is_none());
        assert!(error.errors().is_none());
        assert_eq!(error.to_string(), "Not found");
    }

    #[test]
    fn test_error_with_all_fields() {
        let details = ErrorDetails {
            message: "Validation failed".to_string(),
            code: Some("VALIDATION_ERROR".to_string()),
            errors: Some(validation_errors()),
        };
        let error = ApiError::from_status(400, details);

        assert!(matches!(error, ApiError::Validation { status: 400, .. }));
        assert_eq!(error.message(), "Validation failed");
        assert_eq!(error.code(), Some("VALIDATION_ERROR"));
        assert_eq!(error.errors(), Some(&validation_errors()));
    }

    #[test]
    fn test_client_error_without_field_errors() {
        let error = ApiError::from_status(409, ErrorDetails::new("User already exists"));
        assert!(matches!(error, ApiError::Request { status: 409, .. }));
        assert_eq!(error.status_code(), 409);
    }

    #[test]
    fn test_network_error() {
        let error = ApiError::network("Network error");
        assert!(error.is_network_error());
        assert_eq!(error.status_code(), 0);
        assert_eq!(error.code(), Some(NETWORK_ERROR_CODE));

        assert!(!ApiError::from_status(404, ErrorDetails::new("x")).is_network_error());
    }

    #[test]
    fn test_auth_error() {
        assert!(ApiError::from_status(401, ErrorDetails::new("Unauthorized")).is_auth_error());
        assert!(!ApiError::from_status(403, ErrorDetails::new("Forbidden")).is_auth_error());
        assert!(!ApiError::from_status(404, ErrorDetails::new("Not found")).is_auth_error());
    }

    #[test]
    fn test_forbidden_and_not_found_errors() {
        assert!(ApiError::from_status(403, ErrorDetails::new("Forbidden")).is_forbidden_error());
        assert!(!ApiError::from_status(401, ErrorDetails::new("x")).is_forbidden_error());
        assert!(ApiError::from_status(404, ErrorDetails::new("Not found")).is_not_found_error());
        assert!(!ApiError::from_status(400, ErrorDetails::new("x")).is_not_found_error());
    }

    #[test]
    fn test_server_errors() {
        for status in [500, 502, 503, 504] {
            let error = ApiError::from_status(status, ErrorDetails::new("Server error"));
            assert!(error.is_server_error(), "{status} should be a server error");
            assert_eq!(error.status_code(), status);
        }
        assert!(!ApiError::from_status(400, ErrorDetails::new("Bad request")).is_server_error());
    }

    #[test]
    fn test_unknown_error_uses_generic_message() {
        let error = ApiError::Unknown { status: 200 };
        assert_eq!(error.message(), UNEXPECTED_ERROR_MESSAGE);
        assert_eq!(error.to_string(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_error_message() {
        let api_error = anyhow::Error::new(ApiError::from_status(
            404,
            ErrorDetails::new("Resource not found"),
        ));
        assert_eq!(error_message(&api_error), "Resource not found");

        // Context wrapped around an ApiError still yields the API message
        let wrapped = api_error.context("Loading wallet");
        assert_eq!(error_message(&wrapped), "Resource not found");

        assert_eq!(
            error_message(&anyhow!("Something went wrong")),
            "Something went wrong"
        );
        assert_eq!(error_message(&anyhow!("")), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_handle_error_returns_message() {
        assert_eq!(handle_error(&anyhow!("Test error")), "Test error");
    }
}
