//! Chat completion request types
//!
//! The gateway relays bodies rather than interpreting them, so only the
//! routing-relevant fields are typed; everything else passes through
//! untouched to the vendor.

use serde::{Deserialize, Serialize};

/// Chat completion request, validated once at the edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Composite model id, `"<vendor>__<native-model>"`
    pub model: String,

    /// Conversation messages, forwarded as-is
    pub messages: Vec<serde_json::Value>,

    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,

    /// Vendor-specific parameters (temperature, max_tokens, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Query parameters for cancelling a completion. The composite model id
/// identifies which vendor receives the cancellation.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelQueryParams {
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_params_roundtrip() {
        let raw = json!({
            "model": "openai__gpt-4",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7,
            "max_tokens": 100,
        });

        let request: ChatCompletionRequest = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(request.model, "openai__gpt-4");
        assert!(!request.stream);
        assert_eq!(request.extra["temperature"], json!(0.7));

        // Serializing back preserves the passthrough parameters
        let serialized = serde_json::to_value(&request).unwrap();
        assert_eq!(serialized["temperature"], json!(0.7));
        assert_eq!(serialized["max_tokens"], json!(100));
    }

    #[test]
    fn test_missing_model_is_rejected() {
        let raw = json!({"messages": []});
        assert!(serde_json::from_value::<ChatCompletionRequest>(raw).is_err());
    }

    #[test]
    fn test_missing_messages_is_rejected() {
        let raw = json!({"model": "openai__gpt-4"});
        assert!(serde_json::from_value::<ChatCompletionRequest>(raw).is_err());
    }
}
