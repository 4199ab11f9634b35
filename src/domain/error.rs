use thiserror::Error;

/// Authentication failures, each with a stable reason string that is
/// surfaced verbatim to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Not authenticated: unknown token")]
    UnknownToken,

    #[error("Not authenticated: inactive token")]
    InactiveToken,

    #[error("Not authenticated: user is not active")]
    InactiveUser,
}

/// Failures resolving a composite model id to a configured vendor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendorResolutionError {
    #[error("Invalid model format. Expected '<vendor>__<model>', e.g. 'openai__gpt-4'")]
    InvalidModelFormat,

    #[error("Unknown vendor '{0}'")]
    UnknownVendor(String),
}

/// Failures talking to a vendor upstream
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{vendor}: request timed out")]
    Timeout { vendor: String },

    #[error("{vendor}: connection failed: {message}")]
    Connection { vendor: String, message: String },

    #[error("{vendor}: upstream returned HTTP {status}")]
    Status { vendor: String, status: u16 },

    #[error("{vendor}: invalid upstream payload: {message}")]
    InvalidPayload { vendor: String, message: String },
}

impl UpstreamError {
    pub fn vendor(&self) -> &str {
        match self {
            Self::Timeout { vendor }
            | Self::Connection { vendor, .. }
            | Self::Status { vendor, .. }
            | Self::InvalidPayload { vendor, .. } => vendor,
        }
    }
}

/// Credential encryption/decryption failures. Decryption never degrades to
/// a partial or unverified plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptionError {
    #[error("Plaintext cannot be empty")]
    EmptyInput,

    #[error("Failed to decrypt credential")]
    Decryption,
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    VendorResolution(#[from] VendorResolutionError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_reasons_are_stable() {
        assert_eq!(AuthError::NotAuthenticated.to_string(), "Not authenticated");
        assert_eq!(
            AuthError::InactiveToken.to_string(),
            "Not authenticated: inactive token"
        );
        assert_eq!(
            AuthError::InactiveUser.to_string(),
            "Not authenticated: user is not active"
        );
        assert_eq!(AuthError::Expired.to_string(), "Token expired");
    }

    #[test]
    fn test_resolution_error_messages() {
        let err = VendorResolutionError::UnknownVendor("acme".to_string());
        assert_eq!(err.to_string(), "Unknown vendor 'acme'");

        assert!(
            VendorResolutionError::InvalidModelFormat
                .to_string()
                .contains("openai__gpt-4")
        );
    }

    #[test]
    fn test_upstream_error_vendor_accessor() {
        let err = UpstreamError::Status {
            vendor: "openai".to_string(),
            status: 503,
        };
        assert_eq!(err.vendor(), "openai");
        assert_eq!(err.to_string(), "openai: upstream returned HTTP 503");
    }

    #[test]
    fn test_domain_error_wraps_sub_errors() {
        let err: DomainError = AuthError::Expired.into();
        assert_eq!(err.to_string(), "Token expired");

        let err: DomainError = EncryptionError::Decryption.into();
        assert_eq!(err.to_string(), "Failed to decrypt credential");
    }
}
