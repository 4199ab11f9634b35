//! OpenAI-compatible error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, UpstreamError};

/// Error types matching OpenAI API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    NotFoundError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// OpenAI-compatible error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    /// Add parameter info
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiErrorType::InvalidRequestError,
            message,
        )
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorType::AuthenticationError,
            message,
        )
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::ServerError,
            message,
        )
    }

    /// Upstream vendor failed
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::ServerError, message)
    }

    /// Upstream vendor timed out
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Authentication(e) => Self::unauthorized(e.to_string()),
            DomainError::VendorResolution(e) => Self::bad_request(e.to_string()),
            DomainError::Upstream(e) => match e {
                UpstreamError::Timeout { .. } => Self::gateway_timeout(e.to_string()),
                _ => Self::bad_gateway(e.to_string()),
            },
            DomainError::Encryption(e) => Self::internal(e.to_string()),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Configuration { message }
            | DomainError::Storage { message }
            | DomainError::Internal { message } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthError, VendorResolutionError};

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid model");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.message, "Invalid model");
    }

    #[test]
    fn test_auth_errors_map_to_401_with_reason() {
        let err: ApiError = DomainError::from(AuthError::InactiveToken).into();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.message, "Not authenticated: inactive token");
    }

    #[test]
    fn test_resolution_errors_map_to_400() {
        let err: ApiError =
            DomainError::from(VendorResolutionError::UnknownVendor("x".into())).into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_errors_map_to_gateway_statuses() {
        let timeout: ApiError = DomainError::from(UpstreamError::Timeout {
            vendor: "openai".into(),
        })
        .into();
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);

        let conn: ApiError = DomainError::from(UpstreamError::Connection {
            vendor: "openai".into(),
            message: "refused".into(),
        })
        .into();
        assert_eq!(conn.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_encryption_errors_are_opaque_500s() {
        let err: ApiError =
            DomainError::from(crate::domain::EncryptionError::Decryption).into();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response.error.message, "Failed to decrypt credential");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unauthorized("Not authenticated");
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("authentication_error"));
        assert!(json.contains("Not authenticated"));
    }
}
