//! Gateway endpoints: model listing, completion dispatch, cancellation
//!
//! OPTIONS preflights answer 204 without touching authentication; every
//! other route requires a verified bearer token.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tracing::info;
use uuid::Uuid;

use crate::api::middleware::RequireAuthToken;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, CancelQueryParams, ChatCompletionRequest, Json, ModelsQueryParams, ModelsResponse,
};
use crate::infrastructure::vendor::{CompletionCall, UpstreamReply};

/// Create the gateway router
pub fn create_proxy_router() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models).options(preflight))
        .route(
            "/chat/completions",
            post(create_chat_completion).options(preflight),
        )
        .route(
            "/chat/completions/{completion_id}",
            delete(cancel_chat_completion),
        )
}

/// CORS preflight: 204, no authentication
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /models
async fn list_models(
    State(state): State<AppState>,
    RequireAuthToken(_subject): RequireAuthToken,
    Query(params): Query<ModelsQueryParams>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let models = state
        .catalog_service
        .list_models(params.force_refresh)
        .await?;

    Ok(Json(ModelsResponse::new(models)))
}

/// POST /chat/completions
async fn create_chat_completion(
    State(state): State<AppState>,
    RequireAuthToken(_subject): RequireAuthToken,
    headers: HeaderMap,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        model = %request.model,
        stream = request.stream,
        "Processing chat completion request"
    );

    if request.messages.is_empty() {
        return Err(ApiError::bad_request("Messages cannot be empty").with_param("messages"));
    }

    let body = serde_json::to_value(&request)
        .map_err(|e| ApiError::internal(format!("Failed to serialize request: {}", e)))?;

    let call = CompletionCall {
        model: request.model,
        stream: request.stream,
        body,
        headers,
    };

    let reply = state.proxy_service.dispatch_completion(call).await?;
    Ok(relay_response(reply))
}

/// DELETE /chat/completions/{completion_id}
async fn cancel_chat_completion(
    State(state): State<AppState>,
    RequireAuthToken(_subject): RequireAuthToken,
    Path(completion_id): Path<String>,
    Query(params): Query<CancelQueryParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    info!(completion_id = %completion_id, model = %params.model, "Cancelling chat completion");

    let reply = state
        .proxy_service
        .cancel_completion(&completion_id, &params.model, &headers)
        .await?;

    Ok(relay_response(reply))
}

/// Turn an upstream reply into an axum response, buffered or live
fn relay_response(reply: UpstreamReply) -> Response {
    let (status, headers, body) = match reply {
        UpstreamReply::Buffered {
            status,
            headers,
            body,
        } => (status, headers, Body::from(body)),
        UpstreamReply::Streaming {
            status,
            headers,
            stream,
        } => (status, headers, Body::from_stream(stream)),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::{CompletionProxy, ModelCatalog, TokenVerifier};
    use crate::domain::{AiModel, AuthError, DomainError, VendorResolutionError};
    use axum::body::to_bytes;
    use axum::http::Request;
    use bytes::Bytes;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct StubVerifier {
        accept: bool,
    }

    #[async_trait::async_trait]
    impl TokenVerifier for StubVerifier {
        async fn verify(&self, _token: &str) -> Result<String, DomainError> {
            if self.accept {
                Ok("123abc456".to_string())
            } else {
                Err(AuthError::InvalidSignature.into())
            }
        }
    }

    #[derive(Debug)]
    struct StubCatalog;

    #[async_trait::async_trait]
    impl ModelCatalog for StubCatalog {
        async fn list_models(&self, _force_refresh: bool) -> Result<Vec<AiModel>, DomainError> {
            Ok(vec![
                AiModel::from_vendor("openai", "gpt-4"),
                AiModel::from_vendor("anthropic", "claude-3"),
            ])
        }
    }

    #[derive(Debug)]
    struct StubProxy;

    #[async_trait::async_trait]
    impl CompletionProxy for StubProxy {
        async fn dispatch_completion(
            &self,
            call: CompletionCall,
        ) -> Result<UpstreamReply, DomainError> {
            if call.model == "unknown__gpt-4" {
                return Err(VendorResolutionError::UnknownVendor("unknown".into()).into());
            }

            Ok(UpstreamReply::Buffered {
                status: reqwest::StatusCode::OK,
                headers: reqwest::header::HeaderMap::new(),
                body: Bytes::from_static(b"{\"id\": \"cmpl-1\"}"),
            })
        }

        async fn cancel_completion(
            &self,
            _completion_id: &str,
            _model: &str,
            _headers: &reqwest::header::HeaderMap,
        ) -> Result<UpstreamReply, DomainError> {
            Ok(UpstreamReply::Buffered {
                status: reqwest::StatusCode::OK,
                headers: reqwest::header::HeaderMap::new(),
                body: Bytes::from_static(b"{\"cancelled\": true}"),
            })
        }
    }

    fn test_app(accept_tokens: bool) -> Router {
        let state = AppState::new(
            Arc::new(StubVerifier {
                accept: accept_tokens,
            }),
            Arc::new(StubCatalog),
            Arc::new(StubProxy),
        );

        create_proxy_router().with_state(state)
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_models_requires_auth() {
        let app = test_app(true);

        let response = app
            .oneshot(Request::get("/models").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("Not authenticated"));
    }

    #[tokio::test]
    async fn test_list_models_with_token() {
        let app = test_app(true);

        let response = app
            .oneshot(
                Request::get("/models")
                    .header("authorization", "Bearer sometoken")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("openai__gpt-4"));
        assert!(body.contains("anthropic__claude-3"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_401_with_reason() {
        let app = test_app(false);

        let response = app
            .oneshot(
                Request::get("/models")
                    .header("authorization", "Bearer sometoken")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("Invalid token signature"));
    }

    #[tokio::test]
    async fn test_preflight_bypasses_auth() {
        for path in ["/models", "/chat/completions"] {
            let app = test_app(false);

            let response = app
                .oneshot(
                    Request::builder()
                        .method("OPTIONS")
                        .uri(path)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
    }

    #[tokio::test]
    async fn test_completion_dispatch() {
        let app = test_app(true);

        let request_body = serde_json::json!({
            "model": "openai__gpt-4",
            "messages": [{"role": "user", "content": "hi"}],
        });

        let response = app
            .oneshot(
                Request::post("/chat/completions")
                    .header("authorization", "Bearer sometoken")
                    .header("content-type", "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("cmpl-1"));
    }

    #[tokio::test]
    async fn test_completion_empty_messages_rejected() {
        let app = test_app(true);

        let request_body = serde_json::json!({
            "model": "openai__gpt-4",
            "messages": [],
        });

        let response = app
            .oneshot(
                Request::post("/chat/completions")
                    .header("authorization", "Bearer sometoken")
                    .header("content-type", "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Messages cannot be empty"));
    }

    #[tokio::test]
    async fn test_completion_unknown_vendor_is_400() {
        let app = test_app(true);

        let request_body = serde_json::json!({
            "model": "unknown__gpt-4",
            "messages": [{"role": "user", "content": "hi"}],
        });

        let response = app
            .oneshot(
                Request::post("/chat/completions")
                    .header("authorization", "Bearer sometoken")
                    .header("content-type", "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Unknown vendor 'unknown'"));
    }

    #[tokio::test]
    async fn test_cancel_completion() {
        let app = test_app(true);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/chat/completions/cmpl-123?model=openai__gpt-4")
                    .header("authorization", "Bearer sometoken")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("cancelled"));
    }

    #[tokio::test]
    async fn test_cancel_without_model_param_is_client_error() {
        let app = test_app(true);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/chat/completions/cmpl-123")
                    .header("authorization", "Bearer sometoken")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
