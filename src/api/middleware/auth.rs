//! Bearer token authentication middleware

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::AuthError;

/// Extractor that requires a valid API token in the Authorization header.
///
/// Carries the verified subject id. Handlers for OPTIONS preflights simply
/// omit this extractor, which is how CORS bypasses authentication.
#[derive(Debug, Clone)]
pub struct RequireAuthToken(pub String);

impl FromRequestParts<AppState> for RequireAuthToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        debug!(
            token_prefix = %token.chars().take(8).collect::<String>(),
            "Authenticating request"
        );

        let subject = state
            .token_service
            .verify(&token)
            .await
            .map_err(ApiError::from)?;

        Ok(RequireAuthToken(subject))
    }
}

/// Pull the bearer token out of the Authorization header.
///
/// Tolerates a missing `Bearer` prefix; an absent or blank value is "Not
/// authenticated".
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::unauthorized(AuthError::NotAuthenticated.to_string()));
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    let token = auth_str
        .strip_prefix("Bearer")
        .unwrap_or(auth_str)
        .trim()
        .to_string();

    if token.is_empty() {
        return Err(ApiError::unauthorized(AuthError::NotAuthenticated.to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123token".parse().unwrap());

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "abc123token");
    }

    #[test]
    fn test_extract_token_without_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "abc123token".parse().unwrap());

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "abc123token");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.message, "Not authenticated");
    }

    #[test]
    fn test_blank_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer   ".parse().unwrap());

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.message, "Not authenticated");
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   abc123token   ".parse().unwrap(),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "abc123token");
    }
}
