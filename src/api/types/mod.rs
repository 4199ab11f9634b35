//! API request/response types
//!
//! Error payloads mirror the OpenAI API format for client compatibility.

pub mod chat;
pub mod error;
pub mod json;
pub mod models;

pub use chat::{CancelQueryParams, ChatCompletionRequest};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use models::{ModelsQueryParams, ModelsResponse};
