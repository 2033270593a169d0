//! Remote data gateway.
//!
//! A thin JSON-over-HTTP GET abstraction in front of the upstream REST data
//! source. One logical attempt per call: no retry, no caching.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a gateway call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The request could not complete or returned a non-2xx status.
    #[error("Network request failed: {message}")]
    Transport {
        /// HTTP status when the upstream answered, `None` for connection failures.
        status: Option<u16>,
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Transport error for a non-2xx upstream response.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Transport error for a request that never got a response.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// True when the upstream answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                status: Some(404),
                ..
            }
        )
    }
}

/// Issues GET requests against the upstream base URL and decodes JSON bodies.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// GET `path` (relative to the base URL) with optional query parameters.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(GatewayError::status(404, "Not Found").is_not_found());
        assert!(!GatewayError::status(500, "Internal Server Error").is_not_found());
        assert!(!GatewayError::connection("connection refused").is_not_found());
        assert!(!GatewayError::Decode("expected value".to_string()).is_not_found());
    }

    #[test]
    fn test_transport_message_is_prefixed() {
        let err = GatewayError::status(503, "HTTP Error: 503 Service Unavailable");
        assert_eq!(
            err.to_string(),
            "Network request failed: HTTP Error: 503 Service Unavailable"
        );
    }
}
