//! Unified Error Type System
//!
//! Centralized error types for the analysis pipeline.
//!
//! ## Error Categories
//!
//! - **ConfigurationMissing**: required settings absent (fail fast, no network)
//! - **MediaFetchFailure**: attachment could not be resolved (absorbed by the resolver)
//! - **GatewayFailure**: primary and fallback endpoints both failed
//! - **ResponseParseFailure**: model output unparseable even after repair
//! - **Unknown**: everything else (caught only at the orchestrator boundary)

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used for log routing and degraded-result decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Required configuration absent
    ConfigurationMissing,
    /// Storage or network error while resolving an attachment
    MediaFetchFailure,
    /// Model endpoint returned non-2xx or could not be reached
    GatewayFailure,
    /// Model output could not be parsed
    ResponseParseFailure,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigurationMissing => write!(f, "CONFIGURATION_MISSING"),
            Self::MediaFetchFailure => write!(f, "MEDIA_FETCH_FAILURE"),
            Self::GatewayFailure => write!(f, "GATEWAY_FAILURE"),
            Self::ResponseParseFailure => write!(f, "RESPONSE_PARSE_FAILURE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum BugsightError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required configuration: {}", .fields.join(", "))]
    ConfigurationMissing { fields: Vec<String> },

    // -------------------------------------------------------------------------
    // Media
    // -------------------------------------------------------------------------
    #[error("Failed to fetch media {reference}: {reason}")]
    MediaFetch { reference: String, reason: String },

    // -------------------------------------------------------------------------
    // Model API
    // -------------------------------------------------------------------------
    /// Non-2xx (or unreachable) endpoint after the fallback attempt
    #[error("Model API error ({}): {body}", .status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()))]
    Gateway { status: Option<u16>, body: String },

    /// Transport-level failure before any status was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// Original parse error, preserved through the repair pass
    #[error("Response parse error: {0}")]
    ResponseParse(#[source] serde_json::Error),

    #[error("No response text from model")]
    NoResponseText,

    // -------------------------------------------------------------------------
    // Execution control
    // -------------------------------------------------------------------------
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Analysis cancelled")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Documentation corpus
    // -------------------------------------------------------------------------
    #[error("Corpus error: {0}")]
    Corpus(String),
}

pub type Result<T> = std::result::Result<T, BugsightError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl BugsightError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a media fetch error
    pub fn media(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MediaFetch {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Map this error onto the pipeline's failure taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::ConfigurationMissing { .. } => {
                ErrorCategory::ConfigurationMissing
            }
            Self::MediaFetch { .. } => ErrorCategory::MediaFetchFailure,
            Self::Gateway { .. } | Self::Http(_) => ErrorCategory::GatewayFailure,
            Self::ResponseParse(_) | Self::NoResponseText | Self::Json(_) => {
                ErrorCategory::ResponseParseFailure
            }
            _ => ErrorCategory::Unknown,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(
            ErrorCategory::ConfigurationMissing.to_string(),
            "CONFIGURATION_MISSING"
        );
        assert_eq!(ErrorCategory::GatewayFailure.to_string(), "GATEWAY_FAILURE");
        assert_eq!(ErrorCategory::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_gateway_error_message_contains_status() {
        let err = BugsightError::Gateway {
            status: Some(503),
            body: "overloaded".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("overloaded"));
        assert_eq!(err.category(), ErrorCategory::GatewayFailure);
    }

    #[test]
    fn test_gateway_error_without_status() {
        let err = BugsightError::Gateway {
            status: None,
            body: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("no status"));
    }

    #[test]
    fn test_configuration_missing_lists_fields() {
        let err = BugsightError::ConfigurationMissing {
            fields: vec!["gateway.api_key".to_string(), "gateway.account_id".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required configuration: gateway.api_key, gateway.account_id"
        );
        assert_eq!(err.category(), ErrorCategory::ConfigurationMissing);
    }

    #[test]
    fn test_parse_categories() {
        let original = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            BugsightError::ResponseParse(original).category(),
            ErrorCategory::ResponseParseFailure
        );
        assert_eq!(
            BugsightError::NoResponseText.category(),
            ErrorCategory::ResponseParseFailure
        );
        assert_eq!(BugsightError::Cancelled.category(), ErrorCategory::Unknown);
    }
}
