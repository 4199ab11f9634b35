//! Model listing types

use serde::{Deserialize, Serialize};

use crate::domain::AiModel;

/// Query parameters for the model listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsQueryParams {
    /// Skip the per-vendor cache and fetch fresh capability lists
    #[serde(default)]
    pub force_refresh: bool,
}

/// Aggregated model listing across all active vendors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<AiModel>,
}

impl ModelsResponse {
    pub fn new(data: Vec<AiModel>) -> Self {
        Self { data }
    }
}
