use serde::{Deserialize, Serialize};

/// Error body returned by the query API on non-success statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable error message
    pub error: String,

    /// JSON path of the offending request element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
