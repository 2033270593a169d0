//! reqwest-backed gateway.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{Gateway, GatewayError};
use crate::config::UpstreamConfig;
use crate::metrics::{UPSTREAM_REQUESTS, UPSTREAM_REQUEST_DURATION};

/// Gateway talking to the upstream over HTTP.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a new gateway for the configured upstream.
    ///
    /// A timeout is only applied when `request_timeout_secs` is set.
    pub fn new(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);

        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::status(
                status.as_u16(),
                format!(
                    "HTTP Error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                ),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::connection(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GatewayError> {
        let start = Instant::now();
        let result = self.send(path, query).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(GatewayError::Transport { status: None, .. }) => "connection_error",
            Err(GatewayError::Transport { .. }) => "http_error",
            Err(GatewayError::Decode(_)) => "decode_error",
        };
        UPSTREAM_REQUESTS.with_label_values(&[outcome]).inc();
        UPSTREAM_REQUEST_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}
