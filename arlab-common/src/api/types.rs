//! Shared API request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========================================
// Authentication Types
// ========================================

/// POST /api/session body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /api/session response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned by every failing endpoint
///
/// # Examples
///
/// ```
/// use arlab_common::api::types::ErrorResponse;
///
/// let body = ErrorResponse::new("UNAUTHORIZED", "Session expired");
/// assert!(body.details.is_none());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: impl Into<String>, message: impl Into<String>, details: Value) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
